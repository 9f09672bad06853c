use anyhow::bail;
use radosgw_charm::resources::{actions, Config, Metadata};

/// Print one of the charm's YAML descriptors: metadata, actions or config
fn main() -> anyhow::Result<()> {
    let kind = std::env::args().nth(1).unwrap_or_else(|| "metadata".into());

    let yaml = match kind.as_str() {
        "metadata" => serde_yaml::to_string(&Metadata::radosgw())?,
        "actions" => serde_yaml::to_string(&actions()?)?,
        "config" => serde_yaml::to_string(&Config::radosgw())?,
        other => bail!("unknown descriptor {other}, expected metadata, actions or config"),
    };

    print!("{yaml}");
    Ok(())
}
