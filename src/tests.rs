#[cfg(test)]
mod tests {
    use crate::error::ModeParmError;
    use crate::mode_page::{build_batch, BatchExecutor, BatchMode, ParameterCatalog, WriteOptions};

    #[test]
    fn test_error_creation() {
        let usage = ModeParmError::usage("bad field list");
        assert!(matches!(usage, ModeParmError::Usage(_)));

        let lookup = ModeParmError::catalog_lookup("unknown field acronym 'XYZ'");
        assert!(matches!(lookup, ModeParmError::CatalogLookup(_)));

        let mismatch = ModeParmError::cdb_size_mismatch("MODE SENSE", false);
        assert_eq!(
            mismatch.to_string(),
            "MODE SENSE(10) rejected as invalid opcode, try --six"
        );
        let mismatch = ModeParmError::cdb_size_mismatch("MODE SELECT", true);
        assert_eq!(
            mismatch.to_string(),
            "MODE SELECT(6) rejected as invalid opcode, try without --six"
        );
    }

    #[test]
    fn test_builder_errors_precede_device_io() {
        let catalog = ParameterCatalog::standard();
        let mut mock = crate::mode_page::testing::MockTransport::with_caching_page(false);

        let result = build_batch(&catalog, "WCE=1,QERR=1", BatchMode::Set, None)
            .and_then(|batch| {
                BatchExecutor::new(&mut mock, catalog, false).set(&batch, &WriteOptions::default())
            });
        assert!(matches!(result, Err(ModeParmError::CatalogLookup(_))));
        assert!(mock.senses.is_empty());
        assert!(mock.selects.is_empty());
    }
}

#[cfg(test)]
mod integration_tests {
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let args = vec!["modeparm", "list"];
        let cli = Cli::try_parse_from(args);
        assert!(cli.is_ok());

        if let Ok(cli) = cli {
            assert!(matches!(cli.command, Commands::List { all: false, .. }));
        }
    }

    #[test]
    fn test_get_command_parsing() {
        let args = vec![
            "modeparm", "-v", "get", "WCE,RCD", "/dev/sg0", "--page", "ca", "--hex",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.verbose);

        if let Commands::Get {
            fields,
            device,
            page,
            hex,
            json,
            ..
        } = cli.command
        {
            assert_eq!(fields, "WCE,RCD");
            assert_eq!(device.as_deref(), Some("/dev/sg0"));
            assert_eq!(page.as_deref(), Some("ca"));
            assert!(hex);
            assert!(!json);
        } else {
            panic!("expected get");
        }
    }

    #[test]
    fn test_set_command_parsing() {
        let args = vec!["modeparm", "set", "WCE=1", "--save", "--dummy", "--six"];
        let cli = Cli::try_parse_from(args).unwrap();

        if let Commands::Set {
            fields,
            device,
            save,
            dummy,
            six,
            ..
        } = cli.command
        {
            assert_eq!(fields, "WCE=1");
            assert!(device.is_none());
            assert!(save && dummy && six);
        } else {
            panic!("expected set");
        }
    }

    #[test]
    fn test_invalid_command_lines() {
        // defaults needs a page
        assert!(Cli::try_parse_from(["modeparm", "defaults", "/dev/sg0"]).is_err());
        // get needs a field list
        assert!(Cli::try_parse_from(["modeparm", "get"]).is_err());
        assert!(Cli::try_parse_from(["modeparm", "get", "WCE", "--hex", "--json"]).is_err());
        assert!(Cli::try_parse_from(["modeparm", "frobnicate"]).is_err());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "modeparm",
            "show",
            "/dev/sda",
            "--log-json",
            "-c",
            "/tmp/modeparm.json",
        ])
        .unwrap();
        assert!(cli.log_json);
        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("/tmp/modeparm.json"))
        );
        assert!(matches!(cli.command, Commands::Show { json: false, .. }));
    }
}
