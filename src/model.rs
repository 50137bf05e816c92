use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportType {
    Phase1,
    Phase2,
    Phase3,
}

/// One entry of a report type's field table: the record key and its section title.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub title: &'static str,
}

const fn field(key: &'static str, title: &'static str) -> FieldSpec {
    FieldSpec { key, title }
}

const PHASE1_FIELDS: &[FieldSpec] = &[
    field("contexto", "Contextualização"),
    field("negocio", "Negócio (Business)"),
    field("regras", "Regras de Negócio"),
    field("especialista", "Especialista"),
    field("coisas", "Coisas (Things)"),
];

// Top-down: user-facing level first.
const PHASE2_FIELDS: &[FieldSpec] = &[
    field("l6_display", "Level 6 \u{2013} Display"),
    field("l5_abstraction", "Level 5 \u{2013} Abstraction"),
    field("l4_storage", "Level 4 \u{2013} Storage"),
    field("l3_border", "Level 3 \u{2013} Border"),
    field("l2_connectivity", "Level 2 \u{2013} Connectivity"),
    field("l1_sensor", "Level 1 \u{2013} Sensor/Actuator"),
];

// Bottom-up: hardware first.
const PHASE3_FIELDS: &[FieldSpec] = &[
    field("impl_l1", "Level 1 \u{2013} Sensor/Actuator (Hardware)"),
    field("impl_l2", "Level 2 \u{2013} Connectivity (Protocols)"),
    field("impl_l3", "Level 3 \u{2013} Border (Gateway/Edge)"),
    field("impl_l4", "Level 4 \u{2013} Storage (Database)"),
    field("impl_l5", "Level 5 \u{2013} Abstraction (Algorithms)"),
    field("impl_l6", "Level 6 \u{2013} Display (Frontend/App)"),
];

impl ReportType {
    pub const ALL: [ReportType; 3] = [ReportType::Phase1, ReportType::Phase2, ReportType::Phase3];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::Phase1 => "phase1",
            ReportType::Phase2 => "phase2",
            ReportType::Phase3 => "phase3",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportType::Phase1 => "Business Report - Phase 1 TpM",
            ReportType::Phase2 => "Requirements Report - Phase 2 TpM",
            ReportType::Phase3 => "Implementation Report - Phase 3 TpM",
        }
    }

    /// Descriptive line printed under the project header, if the phase has one.
    pub fn caption(self) -> Option<&'static str> {
        match self {
            ReportType::Phase1 => None,
            ReportType::Phase2 => Some("Top-down approach: from user to thing"),
            ReportType::Phase3 => Some("Bottom-up approach: from hardware to interface"),
        }
    }

    pub fn field_table(self) -> &'static [FieldSpec] {
        match self {
            ReportType::Phase1 => PHASE1_FIELDS,
            ReportType::Phase2 => PHASE2_FIELDS,
            ReportType::Phase3 => PHASE3_FIELDS,
        }
    }

    pub fn accepts_attachments(self) -> bool {
        matches!(self, ReportType::Phase1)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phase1" | "fase1" => Ok(ReportType::Phase1),
            "phase2" | "fase2" => Ok(ReportType::Phase2),
            "phase3" | "fase3" => Ok(ReportType::Phase3),
            other => Err(Error::InvalidInput(format!("unknown report type {other:?}"))),
        }
    }
}

/// Immutable input to one generation run.
#[derive(Clone, Debug)]
pub struct ReportRequest {
    pub report_type: ReportType,
    pub project_name: String,
    pub responsible: String,
    pub field_values: BTreeMap<String, String>,
}

impl ReportRequest {
    pub fn new(
        report_type: ReportType,
        project_name: impl Into<String>,
        responsible: impl Into<String>,
        field_values: BTreeMap<String, String>,
    ) -> Result<Self, Error> {
        if field_values.keys().any(|k| k.trim().is_empty()) {
            return Err(Error::InvalidInput("field map contains an empty key".into()));
        }
        let table = report_type.field_table();
        for key in field_values.keys() {
            if !table.iter().any(|f| f.key == key) {
                log::debug!("Ignoring field {key:?}: not part of the {report_type} table");
            }
        }
        Ok(Self {
            report_type,
            project_name: project_name.into(),
            responsible: responsible.into(),
            field_values,
        })
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.field_values.get(key).map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    ListItem { text: String, indent_level: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Style {
    Plain,
    Bold,
    Italic,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub style: Style,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Origin {
    Upload,
    Existing,
}

#[derive(Clone, Debug)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub origin: Origin,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>, origin: Origin) -> Self {
        Self {
            filename: filename.into(),
            bytes,
            origin,
        }
    }
}
