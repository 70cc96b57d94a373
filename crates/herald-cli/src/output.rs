use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// One line per skipped or announced card, indented under the cycle header.
pub fn print_item(title: &str, status: &str) {
    println!("  {title}  →  {status}");
}
