//! 共享库集成测试

mod metrics_tests {
    use talk_shared::observability::metrics::{
        record_dispatch_failure, record_milestone_badge, record_milestone_notification,
        record_milestone_suppressed, render,
    };

    #[test]
    fn test_record_all_sites() {
        for site in [
            "game_bookmark",
            "talk_pick_bookmark",
            "talk_pick_comment",
            "comment_reply",
            "comment_like",
        ] {
            record_milestone_notification(site, "milestone");
            record_milestone_suppressed(site);
        }
        record_milestone_notification("comment_reply", "first_reply");
        record_milestone_badge("game_bookmark", 100);
        record_milestone_badge("comment_like", 1000);
        record_dispatch_failure("talk_pick_comment");

        // 未安装 recorder 时不导出
        assert!(render().is_none());
    }
}

mod config_tests {
    use std::path::PathBuf;

    use talk_shared::config::{AppConfig, ConfigSources, RuntimeEnv};
    use talk_shared::observability::LogFormat;

    fn workspace_config_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config")
    }

    fn load(environment: &str) -> AppConfig {
        let sources = ConfigSources {
            config_dir: workspace_config_dir(),
            environment: environment.to_string(),
            database_url: None,
        };
        let config = sources.builder("milestone-service").unwrap().build().unwrap();
        AppConfig::from_config(config).unwrap()
    }

    #[test]
    fn test_repository_default_config() {
        let config = load("development");
        assert_eq!(config.environment, RuntimeEnv::Development);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert_eq!(config.observability.service_name, "milestone-service");
    }

    #[test]
    fn test_production_overlay() {
        let config = load("production");
        assert!(config.is_production());
        assert_eq!(config.database.max_connections, 30);
        assert_eq!(config.database.connect_timeout_seconds, 30);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert!(config.observability.metrics_enabled);
    }
}
