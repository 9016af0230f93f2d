#[cfg(test)]
mod tests {
    use super::super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_both_sections() {
        let config = Config::parse(
            r#"
            [analyze]
            receptor = "receptor.pdbqt"
            center_x = 12.5
            exhaustiveness = 16

            [collect]
            input = "./out"
            percentage = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.analyze.receptor, Some(PathBuf::from("receptor.pdbqt")));
        assert_eq!(config.analyze.center_x, Some(12.5));
        assert_eq!(config.analyze.exhaustiveness, Some(16));
        assert_eq!(config.collect.percentage, Some(5));
        assert_eq!(config.collect.limit, None);
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.analyze.input.is_none());
        assert!(config.collect.output.is_none());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::parse("[collect]\npercentile = 10\n").is_err());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempdir().unwrap();
        let err = Config::load(Some(dir.path().join("vinyx.toml").as_path())).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vinyx.toml");
        std::fs::write(&path, "[collect]\nlimit = 100\n").unwrap();
        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.collect.limit, Some(100));
    }

    #[test]
    fn test_default_executables() {
        assert_eq!(default_vina(), PathBuf::from("vina"));
        assert_eq!(default_obabel(), PathBuf::from("obabel"));
        assert_eq!(default_analyze_output(), PathBuf::from("./out"));
    }
}
