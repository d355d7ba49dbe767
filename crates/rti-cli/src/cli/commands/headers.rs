use std::fs;

use anyhow::Context;
use rti_core::fraud::WIRE_PREFIX;
use rti_core::{DeviceContext, FileDeviceStore, HeaderGenerator};

use crate::cli::args::HeadersArgs;
use crate::exit_codes::SUCCESS;

pub fn run(args: HeadersArgs) -> anyhow::Result<i32> {
    let store = match &args.state_dir {
        Some(dir) => FileDeviceStore::in_dir(dir),
        None => FileDeviceStore::new()?,
    };
    tracing::debug!(path = %store.path().display(), "device store");

    let context = match &args.device {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str::<DeviceContext>(&raw)
                .with_context(|| format!("failed to parse device context {}", path.display()))?
        }
        None => DeviceContext::default(),
    };

    let generator = HeaderGenerator::with_context(store, context);
    let headers = generator.generate_headers(args.user_id.as_deref())?;

    let mut out = serde_json::Map::new();
    for (name, value) in headers.iter() {
        let key = if args.wire {
            format!("{}{}", WIRE_PREFIX, name)
        } else {
            name.to_string()
        };
        out.insert(key, serde_json::Value::String(value.to_string()));
    }

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(SUCCESS)
}
