// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn doc_id_is_scoped_to_calendars_namespace() {
    let cal = Calendar::new("sched1", "holidays", serde_json::json!({"excluded": []}));
    assert_eq!(cal.doc_id(), "sched1/calendars/holidays");
}

#[test]
fn payload_round_trips() {
    let cal = Calendar::new("sched1", "holidays", serde_json::json!({"excluded": ["2026-12-25"]}));
    let encoded = serde_json::to_string(&cal).unwrap();
    let decoded: Calendar = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, cal);
}
