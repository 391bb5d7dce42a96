// Copyright 2026 Boundless Foundation, Inc.
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

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::str::contains;
use serde_json::json;

const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const ANVIL_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

/// Command isolated from the caller's environment and working directory.
fn chanceroom(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("chanceroom").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("CHANCEROOM_NETWORK")
        .env_remove("CHANCEROOM_RPC_URL")
        .env_remove("CHANCEROOM_CONFIG")
        .env_remove("CHANCEROOM_SECRETS")
        .env_remove("CHANCEROOM_PRIVATE_KEY")
        .env_remove("CHANCEROOM_ROOM_OWNER_KEY")
        .env_remove("EXPLORER_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    chanceroom(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("factory"))
        .stdout(contains("room"))
        .stdout(contains("bootstrap"))
        .stdout(contains("--network"));
}

#[test]
fn room_new_requires_an_nft() {
    let dir = tempfile::tempdir().unwrap();
    chanceroom(&dir).args(["room", "new"]).assert().failure().stderr(contains("--nft-address"));
}

#[test]
fn unsupported_network_exits_with_configuration_code() {
    let dir = tempfile::tempdir().unwrap();
    chanceroom(&dir)
        .args(["--network", "eth", "--rpc-url", "http://127.0.0.1:1", "factory", "names"])
        .assert()
        .code(2)
        .stderr(contains("unsupported network"));
}

#[test]
fn unknown_network_exits_with_configuration_code() {
    let dir = tempfile::tempdir().unwrap();
    chanceroom(&dir)
        .args(["--network", "atlantis", "config"])
        .assert()
        .code(2)
        .stderr(contains("unknown network 'atlantis'"));
}

#[test]
fn custom_network_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("chanceroom.toml"),
        r#"
[networks.devnet]
chain_id = 1337
rpc_url = "http://127.0.0.1:8545"
factory_address = "0x00000000000000000000000000000000000000aa"

[confirmation]
timeout_secs = 30
"#,
    )
    .unwrap();

    chanceroom(&dir)
        .args(["--network", "devnet", "--private-key", ANVIL_KEY, "config"])
        .assert()
        .success()
        .stdout(contains("1337"))
        .stdout(contains("0x00000000000000000000000000000000000000aa"))
        .stdout(contains(ANVIL_ADDRESS))
        .stdout(contains("30s"))
        .stdout(contains("polygon-mumbai (80001)"))
        .stdout(contains("0xc5197e5dcee9268ea665086fe918872bd3bb5318"));
}

#[test]
fn write_commands_need_a_deployer_key() {
    let dir = tempfile::tempdir().unwrap();
    chanceroom(&dir)
        .args(["--network", "polygon-mumbai", "factory", "add-impl"])
        .arg("0x0000000000000000000000000000000000000001")
        .assert()
        .code(2)
        .stderr(contains("deployer private key"));
}

#[test]
fn chain_id_mismatch_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/").body_contains("eth_chainId");
        then.status(200).json_body(json!({ "jsonrpc": "2.0", "id": 0, "result": "0x1" }));
    });

    let dir = tempfile::tempdir().unwrap();
    chanceroom(&dir)
        .args(["--network", "polygon-mumbai", "--rpc-url", &server.base_url(), "factory", "names"])
        .assert()
        .code(2)
        .stderr(contains("does not match configured chain id 80001"));
}

#[test]
fn unreachable_node_exits_with_rpc_code() {
    let dir = tempfile::tempdir().unwrap();
    chanceroom(&dir)
        .args(["--network", "polygon-mumbai", "--rpc-url", "http://127.0.0.1:1", "factory", "names"])
        .assert()
        .code(3)
        .stderr(contains("failed to connect to polygon-mumbai"));
}

#[test]
fn explicit_config_file_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    chanceroom(&dir)
        .args(["--config", "elsewhere.toml", "config"])
        .assert()
        .code(2)
        .stderr(contains("elsewhere.toml"));
}
