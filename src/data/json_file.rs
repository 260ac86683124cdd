//! Pretty-printed JSON files behind the preference and template repositories.

use {
    anyhow::{Context, Result},
    serde::{Serialize, de::DeserializeOwned},
    std::{
        fs::File,
        io::{BufReader, BufWriter, Write},
        path::Path,
    },
};

/// `None` when the file does not exist yet.
pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

pub(crate) fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_json_pretty(file, value).with_context(|| format!("Failed to write {}", path.display()))
}

/// The buffer is flushed explicitly so a failed final write is reported.
pub(crate) fn write_json_pretty<W: Write, T: Serialize>(writer: W, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::BTreeMap, io};

    /// Accepts nothing; the error only surfaces once the buffer drains.
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_flush_is_an_error() {
        let value = BTreeMap::from([("theme", "dark")]);
        let err = write_json_pretty(FullDisk, &value).expect_err("write must fail");
        assert!(format!("{:#}", err).contains("no space left"));
    }

    #[test]
    fn pretty_output_is_complete() {
        let value = BTreeMap::from([("a", 1), ("b", 2)]);
        let mut out = Vec::new();
        write_json_pretty(&mut out, &value).expect("write");
        assert_eq!(String::from_utf8(out).expect("utf8"), "{\n  \"a\": 1,\n  \"b\": 2\n}");
    }

    #[test]
    fn missing_file_is_none_and_saved_file_loads() {
        let dir = std::env::temp_dir().join(format!("traderoad_json_{}", uuid::Uuid::new_v4().simple()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("store.json");

        assert!(load_json::<BTreeMap<String, i32>>(&path).expect("load").is_none());

        let value = BTreeMap::from([("x".to_string(), 7)]);
        save_json(&path, &value).expect("save");
        assert_eq!(load_json::<BTreeMap<String, i32>>(&path).expect("load"), Some(value));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
