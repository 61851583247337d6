use crate::TopologyArgs;
use crate::utils::load_topology;

pub fn handle(args: &TopologyArgs) -> anyhow::Result<()> {
    let config = load_topology(args)?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
