//! Structural validation walk.
//!
//! Walks a message definition's ordered members against the parsed token
//! sequence. The walk is descriptive only: it consumes an explicit index
//! into the flat token list, records human-readable errors, and never
//! reorders, drops, or re-parses data. Component definitions are resolved
//! lazily by name on every visit, which keeps recursive component reuse
//! free of any materialized member tree.

use fixline_dict::{Dictionary, Member, MemberKind};
use fixline_proto::RawField;

/// Run the structural walk for one message. Returns the recorded errors;
/// an unknown MsgType or an empty one validates vacuously.
pub(crate) fn validate_structure(
    dict: &Dictionary,
    msg_type: &str,
    message: &str,
    fields: &[RawField],
) -> Vec<String> {
    let mut errors = Vec::new();
    if msg_type.is_empty() {
        return errors;
    }
    let Some(message_def) = dict.message_by_type(msg_type) else {
        return errors;
    };

    // Position at the first token the definition can account for, skipping
    // session-header tags that are not members of the message body.
    let mut index = 0;
    let mut positioned = false;
    if let Some(start_tag) = leading_tag_of_list(dict, &message_def.members) {
        while index < fields.len() {
            if fields[index].tag == start_tag {
                positioned = true;
                break;
            }
            index += 1;
        }
    }

    if !positioned {
        index = 0;
        'scan: while index < fields.len() {
            for member in &message_def.members {
                if leading_tag_of_member(dict, member) == Some(fields[index].tag) {
                    break 'scan;
                }
            }
            index += 1;
        }
    }

    walk_members(dict, &message_def.members, message, fields, &mut index, &mut errors, true);
    errors
}

/// Leading tag of one member: a field or group resolves through its field
/// definition; a component resolves through its first resolvable member.
fn leading_tag_of_member(dict: &Dictionary, member: &Member) -> Option<u32> {
    match member.kind {
        MemberKind::Field | MemberKind::Group => {
            dict.field_by_name(&member.name).map(|def| def.number)
        },
        MemberKind::Component => {
            leading_tag_of_list(dict, dict.component_by_name(&member.name)?)
        },
    }
}

fn leading_tag_of_list(dict: &Dictionary, members: &[Member]) -> Option<u32> {
    members.iter().find_map(|member| leading_tag_of_member(dict, member))
}

/// Walk every member of a list in order, accumulating errors. Individual
/// misses never abort the walk. Returns whether any member consumed tokens.
fn walk_members(
    dict: &Dictionary,
    members: &[Member],
    message: &str,
    fields: &[RawField],
    index: &mut usize,
    errors: &mut Vec<String>,
    enforce_presence: bool,
) -> bool {
    let mut consumed_any = false;
    for member in members {
        let before = *index;
        walk_member(dict, member, message, fields, index, errors, enforce_presence);
        if *index > before {
            consumed_any = true;
        }
    }
    consumed_any
}

/// Walk one member; returns whether it consumed tokens.
fn walk_member(
    dict: &Dictionary,
    member: &Member,
    message: &str,
    fields: &[RawField],
    index: &mut usize,
    errors: &mut Vec<String>,
    enforce_presence: bool,
) -> bool {
    match member.kind {
        MemberKind::Field => {
            let Some(def) = dict.field_by_name(&member.name) else {
                return false;
            };

            if *index < fields.len() && fields[*index].tag == def.number {
                *index += 1;
                return true;
            }

            if member.required && enforce_presence {
                errors.push(format!("Missing required field '{}'", member.name));
            }
            false
        },

        MemberKind::Component => {
            let Some(component_members) = dict.component_by_name(&member.name) else {
                if member.required && enforce_presence {
                    errors.push(format!("Missing required component '{}'", member.name));
                }
                return false;
            };

            // A component whose leading tag is not at the cursor is absent.
            if let Some(expected_tag) = leading_tag_of_list(dict, component_members) {
                if *index >= fields.len() || fields[*index].tag != expected_tag {
                    if member.required && enforce_presence {
                        errors.push(format!("Missing required component '{}'", member.name));
                    }
                    return false;
                }
            }

            let start_index = *index;
            walk_members(dict, component_members, message, fields, index, errors, true);
            let consumed = *index > start_index;

            if member.required && enforce_presence && !consumed {
                errors.push(format!("Missing required component '{}'", member.name));
            }
            consumed
        },

        MemberKind::Group => {
            let Some(count_def) = dict.field_by_name(&member.name) else {
                return false;
            };

            if *index >= fields.len() || fields[*index].tag != count_def.number {
                if member.required && enforce_presence {
                    errors.push(format!("Missing required group-count field '{}'", member.name));
                }
                return false;
            }

            let count_value = &message[fields[*index].value.clone()];
            let Some(declared) = parse_group_count(count_value) else {
                errors.push(format!("Invalid group-count value for '{}'", member.name));
                *index += 1;
                return true;
            };

            *index += 1;
            let mut actual = 0usize;
            for _ in 0..declared {
                let entry_start = *index;
                walk_members(dict, &member.children, message, fields, index, errors, true);
                if *index == entry_start {
                    break;
                }
                actual += 1;
            }

            if actual != declared {
                errors.push(format!(
                    "Group '{}' count mismatch: declared {}, actual {}",
                    member.name, declared, actual
                ));
            }
            true
        },
    }
}

/// Full-consume non-negative decimal; no explicit sign.
fn parse_group_count(value: &str) -> Option<usize> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
