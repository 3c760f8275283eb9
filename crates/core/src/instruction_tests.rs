// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn misfire_instruction_default_is_smart_policy() {
    assert_eq!(MisfireInstruction::default(), MisfireInstruction::SmartPolicy);
}

#[test]
fn misfire_instruction_display() {
    assert_eq!(MisfireInstruction::IgnoreMisfirePolicy.to_string(), "ignore_misfire_policy");
}

#[test]
fn completion_instruction_display() {
    assert_eq!(CompletionInstruction::DeleteTrigger.to_string(), "delete_trigger");
    assert_eq!(CompletionInstruction::NoInstruction.to_string(), "no_instruction");
}

#[test]
fn instructions_round_trip_json() {
    let encoded = serde_json::to_string(&MisfireInstruction::FireOnceNow).unwrap();
    assert_eq!(encoded, "\"fire_once_now\"");
    let decoded: MisfireInstruction = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, MisfireInstruction::FireOnceNow);
}
