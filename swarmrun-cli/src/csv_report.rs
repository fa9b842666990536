use std::io::Write;

use swarmrun::acceptance::AcceptanceReport;

pub(crate) fn write_csv_report<W: Write>(report: &AcceptanceReport, writer: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["check", "result", "detail"])?;
    for check in &report.checks {
        let result = if check.passed { "ok" } else { "not ok" };
        writer.write_record([check.name.as_str(), result, check.detail.as_str()])?;
    }
    writer.flush()?;

    anyhow::Ok(())
}

pub(crate) fn write_json_report<W: Write>(report: &AcceptanceReport, mut writer: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;

    anyhow::Ok(())
}
