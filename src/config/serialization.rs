//! Config serialization to TOML. Single source of truth for the config
//! file format. `Config::ensure_config_exists` and `cli::handle_config_reset`
//! both write exactly what this produces.

use super::Config;

impl Config {
    pub fn to_toml(&self) -> String {
        format!(
            "# provenance-processor configuration\n\
             # env vars override these values: PROV_BIND, PROV_WORKERS,\n\
             # PROV_DRAIN_INTERVAL_MS, PROV_LOG / RUST_LOG\n\
             \n\
             bind_addr = \"{}\"\n\
             worker_pool_size = {}\n\
             drain_interval_ms = {}\n\
             \n\
             [logging]\n\
             level = \"{}\"\n",
            self.bind_addr, self.worker_pool_size, self.drain_interval_ms, self.logging.level,
        )
    }
}
