use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::command::CommandSpec;

/// Writes a `/bin/sh` script body to `dir/name`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\nset -e\n{}", body)).expect("Could not write test script");
    path
}

/// Launcher running `script` through `sh`, so the file never needs to be
/// executable.
#[must_use]
pub fn script_command(script: &Path) -> CommandSpec {
    CommandSpec::new("sh").arg(script)
}

/// FASTA text with `count` two-line records, headers carrying an abundance.
#[must_use]
pub fn fasta_records(count: usize) -> String {
    const BASES: [char; 4] = ['A', 'C', 'G', 'T'];

    let mut fasta = String::new();
    for i in 0..count {
        let sequence: String = (0..40).map(|j| BASES[(i * 7 + j * 3) % 4]).collect();
        let _ = writeln!(fasta, ">seq{};size={}", i, i % 5 + 1);
        let _ = writeln!(fasta, "{}", sequence);
    }
    fasta
}

/// Stand-in for `swarmwrapper`: `cluster <in> ... -w <fasta> -a <csv>` writes
/// `fasta_lines` and `csv_lines` lines; `-V` prints `version`.
pub fn fake_swarmwrapper(
    dir: &Path,
    version: &str,
    fasta_lines: usize,
    csv_lines: usize,
) -> PathBuf {
    write_script(
        dir,
        "swarmwrapper",
        &format!(
            r#"if [ "$1" = "-V" ]; then
    echo "{version}"
    exit 0
fi
[ "$1" = "cluster" ]
[ -s "$2" ]
echo "$@" > "$(dirname "$0")/swarmwrapper.args"
fasta=""
csv=""
while [ $# -gt 0 ]; do
    case "$1" in
        -w) fasta="$2"; shift ;;
        -a) csv="$2"; shift ;;
    esac
    shift
done
i=0
while [ $i -lt {fasta_lines} ]; do echo ">s$i" >> "$fasta"; i=$((i + 1)); done
i=0
while [ $i -lt {csv_lines} ]; do echo "s$i,c$i" >> "$csv"; i=$((i + 1)); done
"#,
            version = version,
            fasta_lines = fasta_lines,
            csv_lines = csv_lines,
        ),
    )
}
