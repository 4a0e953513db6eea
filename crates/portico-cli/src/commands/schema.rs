use portico_core::{ApiVersionRecord, MutationBatch};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaTarget};
use crate::output::output;

/// Handle `portico schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&schema_for(args.target), flags.format)
}

fn schema_for(target: SchemaTarget) -> schemars::Schema {
    match target {
        SchemaTarget::Batch => schemars::schema_for!(MutationBatch),
        SchemaTarget::Record => schemars::schema_for!(ApiVersionRecord),
    }
}
