fn main() -> anyhow::Result<()> {
    auditflow::run()?;
    Ok(())
}
