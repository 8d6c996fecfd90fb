//! QuickFIX XML parsing and directory scanning.
//!
//! The recognized schema subset:
//!
//! ```text
//! <fix type="FIX|FIXT" major=".." minor=".." servicepack="..">
//!   <fields>    <field number name type> <value enum description/> ... </field> ... </fields>
//!   <messages>  <message name msgtype msgcat> members... </message> ... </messages>
//!   <components><component name> members... </component> ... </components>
//! </fix>
//! ```
//!
//! Member elements are `field`, `component`, and `group`; groups nest.
//! Unknown sections (`header`, `trailer`, vendor extensions) are skipped
//! whole. A `required` attribute marks a member required iff it starts with
//! `Y` or `y`.

use std::{fs, path::Path};

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::{
    error::DictionaryError,
    model::{Dictionary, DictionarySet, FieldDef, FieldEnum, Member, MemberKind},
};

/// Parse failure before a file path is attached.
enum ParseFailure {
    Xml(String),
    NoRoot,
}

impl ParseFailure {
    fn with_path(self, path: &str) -> DictionaryError {
        match self {
            Self::Xml(reason) => DictionaryError::Xml { path: path.to_string(), reason },
            Self::NoRoot => DictionaryError::MissingRoot { path: path.to_string() },
        }
    }
}

impl From<quick_xml::Error> for ParseFailure {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

/// First value of attribute `key`, unescaped.
fn attr_value(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok())
        .map(|value| value.into_owned())
}

/// Attribute parsed as `u32`; missing or malformed values read as 0.
fn attr_uint(element: &BytesStart<'_>, key: &[u8]) -> u32 {
    attr_value(element, key).and_then(|value| value.parse().ok()).unwrap_or(0)
}

/// Compose a BeginString from the root attributes. `FIXT` keeps its own
/// prefix; everything else is labelled `FIX`.
fn build_begin_string(fix_type: &str, major: u32, minor: u32) -> String {
    if fix_type == "FIXT" {
        format!("FIXT.{major}.{minor}")
    } else {
        format!("FIX.{major}.{minor}")
    }
}

fn member_kind(name: &[u8]) -> Option<MemberKind> {
    match name {
        b"field" => Some(MemberKind::Field),
        b"component" => Some(MemberKind::Component),
        b"group" => Some(MemberKind::Group),
        _ => None,
    }
}

fn member_from_element(element: &BytesStart<'_>, kind: MemberKind) -> Member {
    Member {
        kind,
        name: attr_value(element, b"name").unwrap_or_default(),
        required: Dictionary::is_required_attr(attr_value(element, b"required").as_deref()),
        children: Vec::new(),
    }
}

/// Collect ordered members until the closing tag named `end` is consumed.
fn parse_members(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<Vec<Member>, ParseFailure> {
    let mut members = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Empty(element) => {
                if let Some(kind) = member_kind(element.name().as_ref()) {
                    members.push(member_from_element(&element, kind));
                }
            },
            Event::Start(element) => match member_kind(element.name().as_ref()) {
                Some(MemberKind::Group) => {
                    let mut member = member_from_element(&element, MemberKind::Group);
                    member.children = parse_members(reader, b"group")?;
                    members.push(member);
                },
                Some(kind) => {
                    members.push(member_from_element(&element, kind));
                    reader.read_to_end(element.name())?;
                },
                None => {
                    reader.read_to_end(element.name())?;
                },
            },
            Event::End(element) if element.name().as_ref() == end => break,
            Event::Eof => return Err(ParseFailure::Xml("unexpected end of document".to_string())),
            _ => {},
        }
    }

    Ok(members)
}

/// Parse one `<field>` definition, including nested `<value>` enums when the
/// element has a body.
fn parse_field_def(
    reader: &mut Reader<&[u8]>,
    element: &BytesStart<'_>,
    has_body: bool,
) -> Result<Option<FieldDef>, ParseFailure> {
    let number = attr_uint(element, b"number");
    let mut def = FieldDef {
        number,
        name: attr_value(element, b"name").unwrap_or_default(),
        type_name: attr_value(element, b"type").unwrap_or_default(),
        enums: Vec::new(),
    };

    if has_body {
        loop {
            match reader.read_event()? {
                Event::Empty(child) | Event::Start(child)
                    if child.name().as_ref() == b"value" =>
                {
                    def.enums.push(FieldEnum {
                        value: attr_value(&child, b"enum").unwrap_or_default(),
                        description: attr_value(&child, b"description").unwrap_or_default(),
                    });
                },
                Event::End(child) if child.name().as_ref() == b"field" => break,
                Event::Eof => {
                    return Err(ParseFailure::Xml("unexpected end of document".to_string()));
                },
                _ => {},
            }
        }
    }

    // Tag numbers are positive; a field without one is unusable metadata.
    Ok((number > 0).then_some(def))
}

fn parse_fields(reader: &mut Reader<&[u8]>, dict: &mut Dictionary) -> Result<(), ParseFailure> {
    loop {
        match reader.read_event()? {
            Event::Start(element) if element.name().as_ref() == b"field" => {
                if let Some(def) = parse_field_def(reader, &element, true)? {
                    dict.fields_by_name.insert(def.name.clone(), def.number);
                    dict.fields.insert(def.number, def);
                }
            },
            Event::Empty(element) if element.name().as_ref() == b"field" => {
                if let Some(def) = parse_field_def(reader, &element, false)? {
                    dict.fields_by_name.insert(def.name.clone(), def.number);
                    dict.fields.insert(def.number, def);
                }
            },
            Event::Start(element) => {
                reader.read_to_end(element.name())?;
            },
            Event::End(element) if element.name().as_ref() == b"fields" => break,
            Event::Eof => return Err(ParseFailure::Xml("unexpected end of document".to_string())),
            _ => {},
        }
    }
    Ok(())
}

fn parse_messages(reader: &mut Reader<&[u8]>, dict: &mut Dictionary) -> Result<(), ParseFailure> {
    loop {
        match reader.read_event()? {
            Event::Start(element) if element.name().as_ref() == b"message" => {
                let name = attr_value(&element, b"name").unwrap_or_default();
                let msg_type = attr_value(&element, b"msgtype").unwrap_or_default();
                let category = attr_value(&element, b"msgcat").unwrap_or_default();
                let members = parse_members(reader, b"message")?;
                if !msg_type.is_empty() {
                    dict.messages.insert(
                        msg_type.clone(),
                        crate::model::MessageDef { name, msg_type, category, members },
                    );
                }
            },
            Event::Empty(element) if element.name().as_ref() == b"message" => {
                let name = attr_value(&element, b"name").unwrap_or_default();
                let msg_type = attr_value(&element, b"msgtype").unwrap_or_default();
                let category = attr_value(&element, b"msgcat").unwrap_or_default();
                if !msg_type.is_empty() {
                    dict.messages.insert(
                        msg_type.clone(),
                        crate::model::MessageDef { name, msg_type, category, members: Vec::new() },
                    );
                }
            },
            Event::Start(element) => {
                reader.read_to_end(element.name())?;
            },
            Event::End(element) if element.name().as_ref() == b"messages" => break,
            Event::Eof => return Err(ParseFailure::Xml("unexpected end of document".to_string())),
            _ => {},
        }
    }
    Ok(())
}

fn parse_components(reader: &mut Reader<&[u8]>, dict: &mut Dictionary) -> Result<(), ParseFailure> {
    loop {
        match reader.read_event()? {
            Event::Start(element) if element.name().as_ref() == b"component" => {
                let name = attr_value(&element, b"name").unwrap_or_default();
                let members = parse_members(reader, b"component")?;
                if !name.is_empty() {
                    dict.components.insert(name, members);
                }
            },
            Event::Start(element) => {
                reader.read_to_end(element.name())?;
            },
            Event::End(element) if element.name().as_ref() == b"components" => break,
            Event::Eof => return Err(ParseFailure::Xml("unexpected end of document".to_string())),
            _ => {},
        }
    }
    Ok(())
}

/// Consume children of `<fix>` until its closing tag.
fn parse_fix_children(
    reader: &mut Reader<&[u8]>,
    dict: &mut Dictionary,
) -> Result<(), ParseFailure> {
    loop {
        match reader.read_event()? {
            Event::Start(element) => match element.name().as_ref() {
                b"fields" => parse_fields(reader, dict)?,
                b"messages" => parse_messages(reader, dict)?,
                b"components" => parse_components(reader, dict)?,
                _ => {
                    reader.read_to_end(element.name())?;
                },
            },
            Event::End(element) if element.name().as_ref() == b"fix" => break,
            Event::Eof => return Err(ParseFailure::Xml("unexpected end of document".to_string())),
            _ => {},
        }
    }
    Ok(())
}

fn parse_document(xml: &str) -> Result<Dictionary, ParseFailure> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(element) if element.name().as_ref() == b"fix" => {
                let fix_type = attr_value(&element, b"type").unwrap_or_default();
                let major = attr_uint(&element, b"major");
                let minor = attr_uint(&element, b"minor");
                let mut dict = Dictionary {
                    begin_string: build_begin_string(&fix_type, major, minor),
                    fix_type,
                    major,
                    minor,
                    servicepack: attr_uint(&element, b"servicepack"),
                    ..Dictionary::default()
                };
                parse_fix_children(&mut reader, &mut dict)?;
                return Ok(dict);
            },
            Event::Eof => return Err(ParseFailure::NoRoot),
            _ => {},
        }
    }
}

impl Dictionary {
    /// Parse one QuickFIX-schema document from memory.
    ///
    /// # Errors
    ///
    /// [`DictionaryError::Xml`] for malformed XML,
    /// [`DictionaryError::MissingRoot`] when there is no `<fix>` element.
    pub fn from_xml(xml: &str) -> Result<Self, DictionaryError> {
        parse_document(xml).map_err(|failure| failure.with_path("<memory>"))
    }

    /// Load one QuickFIX-schema document from disk.
    ///
    /// # Errors
    ///
    /// [`DictionaryError::Io`] when the file cannot be read, plus the
    /// failures of [`Dictionary::from_xml`].
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let display = path.as_ref().display().to_string();
        let xml = fs::read_to_string(path.as_ref())
            .map_err(|err| DictionaryError::Io { path: display.clone(), reason: err.to_string() })?;
        parse_document(&xml).map_err(|failure| failure.with_path(&display))
    }
}

impl DictionarySet {
    /// Load every `*.xml` document in `dir` (non-recursive) and index each by
    /// its computed BeginString.
    ///
    /// A file that fails to load is logged at `warn` and skipped; the scan
    /// only fails when it produces no dictionary at all.
    ///
    /// # Errors
    ///
    /// [`DictionaryError::Io`] when the directory cannot be read, or
    /// [`DictionaryError::NoneLoaded`] when no document loaded (the message
    /// carries the joined per-file failures).
    pub fn load_from_directory(dir: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let display = dir.as_ref().display().to_string();
        let entries = fs::read_dir(dir.as_ref())
            .map_err(|err| DictionaryError::Io { path: display.clone(), reason: err.to_string() })?;

        let mut set = DictionarySet::new();
        let mut failures = Vec::new();

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.extension().map_or(true, |ext| ext != "xml") {
                continue;
            }

            match Dictionary::load_from_file(&path) {
                Ok(dict) => {
                    tracing::debug!(
                        path = %path.display(),
                        begin_string = %dict.begin_string(),
                        fields = dict.fields.len(),
                        messages = dict.messages.len(),
                        "loaded dictionary"
                    );
                    set.insert(dict);
                },
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping dictionary");
                    failures.push(err.to_string());
                },
            }
        }

        if set.is_empty() {
            let failures = if failures.is_empty() {
                String::new()
            } else {
                format!(". Errors: {}", failures.join("; "))
            };
            return Err(DictionaryError::NoneLoaded { path: display, failures });
        }

        Ok(set)
    }
}
