// SPDX-License-Identifier: MIT OR Apache-2.0
//! URI parser totality: every input yields exactly one transport or fails.

use zap_client::{DEFAULT_PORT, Endpoint};
use zap_core::ErrorCode;

#[test]
fn tcp_with_port() {
    let ep = Endpoint::parse("zap://localhost:9999").unwrap();
    assert_eq!(
        ep,
        Endpoint::Tcp {
            host: "localhost".into(),
            port: 9999
        }
    );
}

#[test]
fn tls_with_port() {
    let ep = Endpoint::parse("zap+tls://secure.example.com:8443").unwrap();
    assert_eq!(
        ep,
        Endpoint::Tls {
            host: "secure.example.com".into(),
            port: 8443
        }
    );
}

#[test]
fn unix_socket_path() {
    let ep = Endpoint::parse("zap+unix:///var/run/zap.sock").unwrap();
    assert_eq!(
        ep,
        Endpoint::Unix {
            path: "/var/run/zap.sock".into()
        }
    );
}

#[test]
fn tcp_default_port() {
    let ep = Endpoint::parse("zap://gateway.local").unwrap();
    assert_eq!(
        ep,
        Endpoint::Tcp {
            host: "gateway.local".into(),
            port: DEFAULT_PORT
        }
    );
}

#[test]
fn tls_default_port() {
    let ep = Endpoint::parse("zap+tls://gateway.local").unwrap();
    assert_eq!(
        ep,
        Endpoint::Tls {
            host: "gateway.local".into(),
            port: DEFAULT_PORT
        }
    );
}

#[test]
fn foreign_scheme_rejected() {
    let err = Endpoint::parse("http://example.com").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidParams);
}

#[test]
fn junk_inputs_rejected() {
    for uri in [
        "",
        "zap",
        "example.com:9999",
        "zap://",
        "zap://host:notaport",
        "zap://host:100000",
        "zap+unix://",
        "tcp://host:1",
    ] {
        let err = Endpoint::parse(uri).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams, "uri: {uri}");
    }
}

#[test]
fn display_round_trips() {
    for uri in [
        "zap://localhost:9999",
        "zap+tls://secure.example.com:8443",
        "zap+unix:///var/run/zap.sock",
    ] {
        let ep = Endpoint::parse(uri).unwrap();
        assert_eq!(ep.to_string(), uri);
        assert_eq!(Endpoint::parse(&ep.to_string()).unwrap(), ep);
    }
}

#[test]
fn default_port_renders_explicitly() {
    let ep = Endpoint::parse("zap://gateway.local").unwrap();
    assert_eq!(ep.to_string(), "zap://gateway.local:9999");
}
