// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! System collaborator tests
//!
//! Nothing here touches the real apt: commands go to recording fakes and
//! Launchpad is served by mockito.

use super::*;
use crate::core::PpaSpec;
use crate::system::distro::parse_os_release;
use crate::system::keys::{export_key_command, import_key_command, KEYSERVER};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Records commands; `export` answers with `export_stdout`, anything
/// listed in `failing` exits non-zero
#[derive(Clone, Default)]
struct FakeRunner {
    calls: Rc<RefCell<Vec<Vec<String>>>>,
    export_stdout: String,
    failing: Vec<&'static str>,
}

impl CommandRunner for FakeRunner {
    fn run(&self, argv: &[String]) -> Result<CommandOutput, RepoError> {
        self.calls.borrow_mut().push(argv.to_vec());
        let sub = argv.get(1).map(String::as_str).unwrap_or_default();
        if self.failing.iter().any(|failing| *failing == sub) {
            return Err(RepoError::ExternalCommandFailure {
                command: argv.join(" "),
                status: "exit status: 2".to_string(),
                stderr: "gpg: keyserver receive failed".to_string(),
            });
        }
        Ok(CommandOutput {
            stdout: if sub == "export" { self.export_stdout.clone() } else { String::new() },
            stderr: String::new(),
        })
    }
}

struct StaticLookup(Result<String, String>);

impl PpaKeyLookup for StaticLookup {
    fn signing_key_fingerprint(&self, _ppa: &PpaSpec) -> Result<String, RepoError> {
        self.0.clone().map_err(RepoError::NetworkFailure)
    }
}

fn nginx() -> PpaSpec {
    PpaSpec {
        owner: "nginx".to_string(),
        name: "stable".to_string(),
    }
}

// ============================================================================
// Distribution detection
// ============================================================================

const UBUNTU: &str = r#"PRETTY_NAME="Ubuntu 20.04.6 LTS"
NAME="Ubuntu"
VERSION_ID="20.04"
VERSION_CODENAME=focal
ID=ubuntu
ID_LIKE=debian
UBUNTU_CODENAME=focal
"#;

const MINT: &str = r#"NAME="Linux Mint"
VERSION_CODENAME=vera
ID=linuxmint
ID_LIKE="ubuntu debian"
UBUNTU_CODENAME=jammy
"#;

const DEBIAN: &str = r#"PRETTY_NAME="Debian GNU/Linux 12 (bookworm)"
ID=debian
VERSION_CODENAME=bookworm
"#;

#[test]
fn test_parse_os_release_unquotes() {
    let fields = parse_os_release("# comment\nNAME=\"Ubuntu\"\nID='ubuntu'\n\nBROKEN\n");

    assert_eq!(fields["NAME"], "Ubuntu");
    assert_eq!(fields["ID"], "ubuntu");
    assert!(!fields.contains_key("BROKEN"));
}

#[test]
fn test_detect_ubuntu() {
    let distro = Distribution::from_os_release(UBUNTU).unwrap();

    assert_eq!(distro.family, DistroFamily::Ubuntu);
    assert_eq!(distro.codename.as_deref(), Some("focal"));
}

#[test]
fn test_detect_derivative_uses_ubuntu_codename() {
    let distro = Distribution::from_os_release(MINT).unwrap();

    assert_eq!(distro.id, "linuxmint");
    assert_eq!(distro.family, DistroFamily::Ubuntu);
    assert_eq!(distro.codename.as_deref(), Some("jammy"));
}

#[test]
fn test_detect_debian() {
    let distro = Distribution::from_os_release(DEBIAN).unwrap();

    assert_eq!(distro.family, DistroFamily::Debian);
    assert_eq!(distro.codename.as_deref(), Some("bookworm"));
}

#[test]
fn test_detect_unsupported() {
    let result = Distribution::from_os_release("ID=fedora\nID_LIKE=\"rhel centos\"\n");
    assert!(matches!(result, Err(RepoError::UnsupportedPlatform(_))));

    let result = Distribution::from_os_release("");
    assert!(matches!(result, Err(RepoError::UnsupportedPlatform(_))));
}

#[test]
fn test_detect_missing_file() {
    let result = Distribution::detect(Path::new("/nonexistent/os-release"));
    assert!(matches!(result, Err(RepoError::UnsupportedPlatform(_))));
}

// ============================================================================
// AptClient
// ============================================================================

#[test]
fn test_apt_client_dry_run_runs_nothing() {
    let runner = FakeRunner::default();
    let apt = AptClient::new(ClientMode::DryRun, Box::new(runner.clone()));

    apt.update_cache().unwrap();

    assert!(runner.calls.borrow().is_empty());
}

#[test]
fn test_apt_client_live_runs_update() {
    let runner = FakeRunner::default();
    let apt = AptClient::new(ClientMode::Live, Box::new(runner.clone()));

    apt.update_cache().unwrap();

    assert_eq!(runner.calls.borrow().as_slice(), &[update_cache_command()]);
}

#[test]
fn test_apt_client_surfaces_failure() {
    let runner = FakeRunner {
        failing: vec!["update"],
        ..FakeRunner::default()
    };
    let apt = AptClient::new(ClientMode::Live, Box::new(runner));

    let err = apt.update_cache().unwrap_err();
    assert!(matches!(err, RepoError::ExternalCommandFailure { .. }));
    assert!(err.to_string().contains("apt-get update"));
}

#[cfg(unix)]
#[test]
fn test_system_runner() {
    let output = SystemRunner.run(&["echo".to_string(), "hello".to_string()]).unwrap();
    assert_eq!(output.stdout.trim(), "hello");

    let result = SystemRunner.run(&["false".to_string()]);
    assert!(matches!(result, Err(RepoError::ExternalCommandFailure { .. })));

    let result = SystemRunner.run(&[]);
    assert!(matches!(result, Err(RepoError::ExternalCommandFailure { .. })));
}

// ============================================================================
// Signing keys
// ============================================================================

#[test]
fn test_key_commands() {
    assert_eq!(
        import_key_command("ABCD"),
        vec!["apt-key", "adv", "--recv-keys", "--keyserver", KEYSERVER, "ABCD"]
    );
    assert_eq!(export_key_command("ABCD"), vec!["apt-key", "export", "ABCD"]);
}

#[test]
fn test_install_imports_missing_key() {
    let runner = FakeRunner::default();
    let installer = SigningKeyInstaller::new(
        Box::new(StaticLookup(Ok("ABCD1234".to_string()))),
        Box::new(runner.clone()),
    );

    let action = installer.install_for(&nginx()).unwrap();

    assert_eq!(action, KeyAction::Imported("ABCD1234".to_string()));
    assert_eq!(
        runner.calls.borrow().as_slice(),
        &[export_key_command("ABCD1234"), import_key_command("ABCD1234")]
    );
}

#[test]
fn test_install_skips_present_key() {
    let runner = FakeRunner {
        export_stdout: "-----BEGIN PGP PUBLIC KEY BLOCK-----\n...".to_string(),
        ..FakeRunner::default()
    };
    let installer = SigningKeyInstaller::new(
        Box::new(StaticLookup(Ok("ABCD1234".to_string()))),
        Box::new(runner.clone()),
    );

    let action = installer.install_for(&nginx()).unwrap();

    assert_eq!(action, KeyAction::AlreadyPresent("ABCD1234".to_string()));
    assert_eq!(runner.calls.borrow().len(), 1);
}

#[test]
fn test_install_lookup_failure_runs_nothing() {
    let runner = FakeRunner::default();
    let installer = SigningKeyInstaller::new(
        Box::new(StaticLookup(Err("connection refused".to_string()))),
        Box::new(runner.clone()),
    );

    let result = installer.install_for(&nginx());

    assert!(matches!(result, Err(RepoError::NetworkFailure(_))));
    assert!(runner.calls.borrow().is_empty());
}

#[test]
fn test_install_import_failure_is_fatal() {
    let runner = FakeRunner {
        failing: vec!["adv"],
        ..FakeRunner::default()
    };
    let installer = SigningKeyInstaller::new(
        Box::new(StaticLookup(Ok("ABCD1234".to_string()))),
        Box::new(runner),
    );

    let err = installer.install_for(&nginx()).unwrap_err();
    assert!(err.to_string().contains("keyserver receive failed"));
}

// ============================================================================
// Launchpad
// ============================================================================

#[test]
fn test_ppa_url() {
    let client = LaunchpadClient::with_base_url("https://launchpad.test/api/1.0/").unwrap();
    assert_eq!(
        client.ppa_url(&nginx()),
        "https://launchpad.test/api/1.0/~nginx/+archive/stable"
    );
}

#[test]
fn test_fetch_signing_key() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/~nginx/+archive/stable")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(concat!(
            r#"{"displayname": "Stable", "#,
            r#""signing_key_fingerprint": "8B3981E7A6852F782CC4951600A6F0A3C300EE8C"}"#,
        ))
        .create();

    let client = LaunchpadClient::with_base_url(server.url()).unwrap();
    let fingerprint = client.signing_key_fingerprint(&nginx()).unwrap();

    assert_eq!(fingerprint, "8B3981E7A6852F782CC4951600A6F0A3C300EE8C");
    mock.assert();
}

#[test]
fn test_fetch_missing_fingerprint() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/~nginx/+archive/stable")
        .with_status(200)
        .with_body(r#"{"signing_key_fingerprint": null}"#)
        .create();

    let client = LaunchpadClient::with_base_url(server.url()).unwrap();
    let err = client.signing_key_fingerprint(&nginx()).unwrap_err();

    assert!(matches!(err, RepoError::NetworkFailure(_)));
    assert!(err.to_string().contains("no signing key"));
}

#[test]
fn test_fetch_http_error() {
    let mut server = mockito::Server::new();
    let _mock = server.mock("GET", "/~nginx/+archive/stable").with_status(404).create();

    let client = LaunchpadClient::with_base_url(server.url()).unwrap();
    let result = client.fetch_ppa_info(&nginx());

    assert!(matches!(result, Err(RepoError::NetworkFailure(_))));
}

#[test]
fn test_fetch_malformed_json() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/~nginx/+archive/stable")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create();

    let client = LaunchpadClient::with_base_url(server.url()).unwrap();
    let result = client.fetch_ppa_info(&nginx());

    assert!(matches!(result, Err(RepoError::NetworkFailure(_))));
}
