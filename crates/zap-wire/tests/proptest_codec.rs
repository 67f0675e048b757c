// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based tests for the framed envelope codec.

use proptest::prelude::*;
use serde_json::{Map, Value};
use zap_wire::{FrameCodec, ZapMessage};

// ── Leaf strategies ─────────────────────────────────────────────────────

fn arb_method() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z.]{0,30}"
}

fn arb_id() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9-]{1,36}"
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 _.@/-]{0,40}".prop_map(Value::from),
    ]
}

fn arb_payload() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-zA-Z][a-zA-Z0-9_]{0,15}", arb_scalar(), 0..8).prop_map(
        |entries| {
            let mut map = Map::new();
            for (k, v) in entries {
                map.insert(k, v);
            }
            Value::Object(map)
        },
    )
}

fn arb_message() -> impl Strategy<Value = ZapMessage> {
    (arb_method(), arb_id(), arb_payload())
        .prop_map(|(kind, id, payload)| ZapMessage::new(kind, id, payload))
}

// ── Laws ────────────────────────────────────────────────────────────────

proptest! {
    /// decode(encode(m)[4..]) == m for every well-formed message.
    #[test]
    fn encode_decode_round_trip(msg in arb_message()) {
        let frame = FrameCodec::encode(&msg).unwrap();
        let decoded = FrameCodec::decode(&frame[4..]).unwrap();
        prop_assert_eq!(decoded, msg);
    }

    /// The u32 prefix always equals the body length.
    #[test]
    fn prefix_equals_body_length(msg in arb_message()) {
        let frame = FrameCodec::encode(&msg).unwrap();
        let declared = u32::from_be_bytes(frame[..4].try_into().unwrap());
        prop_assert_eq!(declared as usize, frame.len() - 4);
    }

    /// Every encoded body is itself valid UTF-8 JSON.
    #[test]
    fn body_is_utf8_json(msg in arb_message()) {
        let frame = FrameCodec::encode(&msg).unwrap();
        let text = std::str::from_utf8(&frame[4..]).unwrap();
        let value: Value = serde_json::from_str(text).unwrap();
        prop_assert!(value.is_object());
    }
}
