use serde_json::Value;
use std::io::{self, Read};

/// Read a piped JSON or YAML document. `None` when stdin is a TTY or empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// JSON first; anything that is not JSON is read as YAML.
fn parse_piped(text: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(Some(value)),
        Err(json_err) => serde_yaml::from_str(trimmed).map(Some).map_err(|yaml_err| {
            format!("stdin is neither JSON ({json_err}) nor YAML ({yaml_err})").into()
        }),
    }
}
