//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_get_defaults() {
    match parse(&["rfetch", "get", "https://example.com/file.iso"]) {
        CliCommand::Get {
            sources,
            output_dir,
            jobs,
            restart,
            size,
            chunk_size,
        } => {
            assert_eq!(sources, vec!["https://example.com/file.iso"]);
            assert!(output_dir.is_none());
            assert!(jobs.is_none());
            assert!(!restart);
            assert!(size.is_none());
            assert!(chunk_size.is_none());
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_get_many_sources_with_options() {
    match parse(&[
        "rfetch",
        "get",
        "https://example.com/a",
        "/data/b.bin",
        "-o",
        "/tmp",
        "--jobs",
        "3",
        "--restart",
        "--chunk-size",
        "65536",
    ]) {
        CliCommand::Get {
            sources,
            output_dir,
            jobs,
            restart,
            chunk_size,
            ..
        } => {
            assert_eq!(sources.len(), 2);
            assert_eq!(output_dir.as_deref(), Some(Path::new("/tmp")));
            assert_eq!(jobs, Some(3));
            assert!(restart);
            assert_eq!(chunk_size, Some(65536));
        }
        _ => panic!("expected Get with options"),
    }
}

#[test]
fn cli_parse_get_size() {
    match parse(&["rfetch", "get", "ftp://example.org/x", "--size", "1048576"]) {
        CliCommand::Get { size, .. } => assert_eq!(size, Some(1_048_576)),
        _ => panic!("expected Get with --size"),
    }
}

#[test]
fn cli_get_requires_a_source() {
    assert!(Cli::try_parse_from(["rfetch", "get"]).is_err());
}

#[test]
fn cli_parse_config() {
    match parse(&["rfetch", "config"]) {
        CliCommand::Config => {}
        _ => panic!("expected Config"),
    }
}
