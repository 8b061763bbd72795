//! Settings loading tests

#[cfg(test)]
mod tests {
    use oracle_quest::{
        config::{Settings, DEFAULT_ADMIN, DEFAULT_LEDGER_PATH, DEFAULT_PROGRAM_ID},
        types::Address,
        ConfigError,
    };
    use parking_lot::{const_mutex, Mutex};
    use std::path::PathBuf;
    use std::time::Duration;

    // The environment is process-wide; every test that loads settings holds
    // this lock.
    static ENV: Mutex<()> = const_mutex(());

    fn write_toml(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    // -----------------------------------------------------------------------
    // Layers
    // -----------------------------------------------------------------------

    #[test]
    fn defaults_apply_without_file() {
        let _env = ENV.lock();
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.program_id, Address::from_hex(DEFAULT_PROGRAM_ID).unwrap());
        assert_eq!(settings.admin, Address::from_hex(DEFAULT_ADMIN).unwrap());
        assert_eq!(settings.ledger_path, PathBuf::from(DEFAULT_LEDGER_PATH));
        assert_eq!(settings.debounce, Duration::from_millis(300));

        let scene = settings.scene_config();
        assert_eq!(scene.request_timeout, settings.request_timeout);
        assert_eq!(scene.width, 800.0);
    }

    #[test]
    fn file_overrides_defaults() {
        let _env = ENV.lock();
        let path = write_toml(
            "oracle-quest-settings",
            "debounce_ms = 50\nrequest_timeout_secs = 3\nledger_path = \"/tmp/quest.json\"\n",
        );
        let settings = Settings::load(Some(path.as_path())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.debounce, Duration::from_millis(50));
        assert_eq!(settings.request_timeout, Duration::from_secs(3));
        assert_eq!(settings.ledger_path, PathBuf::from("/tmp/quest.json"));
    }

    #[test]
    fn environment_overrides_file_and_defaults() {
        let _env = ENV.lock();
        let path = write_toml("oracle-quest-env-settings", "debounce_ms = 50\n");

        std::env::set_var("ORACLE_QUEST_DEBOUNCE_MS", "125");
        let with_file = Settings::load(Some(path.as_path()));
        let without_file = Settings::load(None);
        std::env::remove_var("ORACLE_QUEST_DEBOUNCE_MS");
        std::fs::remove_file(&path).ok();

        assert_eq!(with_file.unwrap().debounce, Duration::from_millis(125));
        assert_eq!(without_file.unwrap().debounce, Duration::from_millis(125));
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn bad_admin_address_is_rejected() {
        let _env = ENV.lock();
        let path = write_toml("oracle-quest-bad-admin", "admin = \"not-hex\"\n");
        let err = Settings::load(Some(path.as_path())).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, ConfigError::InvalidAddress { key: "admin", .. }));
    }

    #[test]
    fn unusable_tick_rates_are_rejected() {
        let _env = ENV.lock();
        for rate in ["1e30", "0", "-5"] {
            let path = write_toml("oracle-quest-tick-rate", &format!("tick_rate_hz = {}\n", rate));
            let result = Settings::load(Some(path.as_path()));
            std::fs::remove_file(&path).ok();

            assert!(
                matches!(result, Err(ConfigError::InvalidValue { key: "tick_rate_hz", .. })),
                "rate {} accepted",
                rate
            );
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let _env = ENV.lock();
        let path = std::env::temp_dir().join("oracle-quest-no-such-settings.toml");
        assert!(matches!(Settings::load(Some(path.as_path())), Err(ConfigError::Load(_))));
    }
}
