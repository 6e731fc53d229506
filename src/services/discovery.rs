use crate::client::FebosClient;
use crate::error::Result;
use crate::transport::Transport;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::BTreeMap;

/// Current value of every known resource. `None` marks an input that exists in the
/// page config but was absent from the real-time response.
pub type Resources = BTreeMap<String, Option<Value>>;

pub fn input_key(installation_id: i64, device_id: i64, thing_id: i64, code: &str) -> String {
    format!("{installation_id}_{device_id}_{thing_id}_{code}")
}

pub fn slave_key(installation_id: i64, device_id: i64, address: &str, field: &str) -> String {
    format!("{installation_id}_{device_id}_{address}_{field}")
}

/// Walk every installation's topology and fill in current values.
///
/// Per installation: page config, then slave snapshots for each device, then one
/// real-time query over all of the installation's input groups. Installations without
/// input groups skip the real-time query. The first endpoint error aborts the walk.
pub fn discover<T: Transport>(client: &FebosClient<T>, installation_ids: &[i64]) -> Result<Resources> {
    let mut resources = Resources::new();

    for &installation_id in installation_ids {
        let config = client.page_config(installation_id)?;
        debug!(
            "Installation {}: {} device(s), {} thing(s)",
            installation_id,
            config.device_map.len(),
            config.thing_map.len()
        );

        for device in config.device_map.values() {
            for slave in client.febos_slaves(installation_id, device.id)? {
                for (field, value) in slave.readings() {
                    resources.insert(
                        slave_key(installation_id, device.id, &slave.indirizzo_slave, field),
                        Some(Value::from(value)),
                    );
                }
            }
        }

        for input in config.inputs() {
            resources
                .entry(input_key(installation_id, input.device_id, input.thing_id, &input.code))
                .or_insert(None);
        }

        let groups = config.input_group_codes();
        if groups.is_empty() {
            info!("Installation {} exposes no input groups; skipping real-time query", installation_id);
            continue;
        }

        for entry in client.realtime_data(installation_id, groups)? {
            for (code, value) in entry.data {
                let key = input_key(installation_id, entry.device_id, entry.thing_id, &code);
                match resources.get_mut(&key) {
                    Some(slot) => *slot = Some(value.i),
                    None => warn!("Key not found: {}", key),
                }
            }
        }
    }

    info!(
        "{} installation(s) loaded, {} resource(s) loaded",
        installation_ids.len(),
        resources.len()
    );
    Ok(resources)
}
