//! Job and template definition files.
//!
//! Files are YAML (JSON is accepted as a subset). The row columns that hold
//! inline JSON (`headers`, `notification_channels`, `notification_config`)
//! may be written either as a JSON string or as a nested YAML value; nested
//! values are serialized to JSON before the row type is decoded.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_yaml::Value;

const INLINE_JSON_FIELDS: [&str; 3] = ["headers", "notification_channels", "notification_config"];

pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&raw).with_context(|| format!("invalid definition in {}", path.display()))
}

pub fn parse<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let mut value: Value = serde_yaml::from_str(raw)?;
    if let Value::Mapping(map) = &mut value {
        for field in INLINE_JSON_FIELDS {
            let key = Value::String(field.to_string());
            let Some(entry) = map.get_mut(&key) else { continue };
            match &*entry {
                Value::String(_) => {}
                Value::Null => *entry = Value::String(String::new()),
                nested => {
                    let json = serde_json::to_string(nested)
                        .with_context(|| format!("cannot encode `{field}` as JSON"))?;
                    *entry = Value::String(json);
                }
            }
        }
    }
    Ok(serde_yaml::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cronpilot_core::{JobTemplate, NewJob};

    #[test]
    fn nested_yaml_becomes_inline_json() {
        let job: NewJob = parse(
            r#"
name: nightly backup
schedule: "0 0 2 * * *"
command: /usr/local/bin/backup.sh
headers:
  X-Token: abc
notification_channels: [email, wechat]
notification_config:
  wechat:
    webhook_url: https://qyapi.example.test/send?key=k
"#,
        )
        .unwrap();
        assert_eq!(job.headers, r#"{"X-Token":"abc"}"#);
        assert_eq!(job.notification_channels, r#"["email","wechat"]"#);
        let cfg = job.into_job(1).notification().unwrap().unwrap();
        assert_eq!(cfg.wechat.unwrap().webhook_url, "https://qyapi.example.test/send?key=k");
    }

    #[test]
    fn string_fields_pass_through_and_json_files_load() {
        let job: NewJob = parse(
            r#"{"name":"ping","schedule":"0 * * * * *","command":"https://example.test",
                "method":"HEAD","notification_channels":"[\"dingtalk\"]"}"#,
        )
        .unwrap();
        assert_eq!(job.method, "HEAD");
        assert_eq!(job.notification_channels, r#"["dingtalk"]"#);
        assert!(job.enabled);
    }

    #[test]
    fn null_field_is_blank() {
        let template: JobTemplate =
            parse("schedule: '0 * * * * *'\ncommand: 'true'\nheaders: ~\n").unwrap();
        assert_eq!(template.headers, "");
        assert!(template.notify_on_failure);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        assert!(parse::<NewJob>("name: x\ncommand: 'true'\n").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load::<NewJob>(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
