//! Record model — the in-memory state of one in-progress intake form.
//!
//! One `FormRecord` holds the 34 named fields of the EMS cardiac-arrest
//! intake sheet. Fields come in three kinds: free text, time-of-day text
//! (`HH:MM` or empty), and tri-state yes/no answers where "unanswered"
//! is distinct from "No". `Field` is the typed field identifier carrying
//! the wire key, display label, kind, section and conditional parent.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

// ─── TriState ─────────────────────────────────────────────────────────────────

/// A yes/no question that may not have been answered yet.
///
/// Never collapse `Unanswered` into `No`: an unanswered question must
/// stay visibly unanswered in every export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    #[default]
    Unanswered,
    No,
    Yes,
}

impl TriState {
    /// Token used in tabular output. Distinguishable from empty text.
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Unanswered => "unanswered",
            Self::No => "false",
            Self::Yes => "true",
        }
    }

    /// Marker used in document output.
    pub fn yes_no(self) -> &'static str {
        match self {
            Self::Unanswered => "—",
            Self::No => "No",
            Self::Yes => "Yes",
        }
    }

    pub fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }

    pub fn as_option(self) -> Option<bool> {
        match self {
            Self::Unanswered => None,
            Self::No => Some(false),
            Self::Yes => Some(true),
        }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Self::Unanswered,
            Some(false) => Self::No,
            Some(true) => Self::Yes,
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value { Self::Yes } else { Self::No }
    }
}

// On the wire a tri-state is `null` / `false` / `true`, matching what
// the submission backend stores.
impl Serialize for TriState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_option() {
            Some(b) => serializer.serialize_bool(b),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for TriState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<bool>::deserialize(deserializer)?.into())
    }
}

// ─── Field identifiers ────────────────────────────────────────────────────────

/// Semantic kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, may be empty.
    Text,
    /// Time of day as text, `HH:MM` or empty. No date, no timezone.
    Time,
    /// Tri-state yes/no answer.
    YesNo,
}

/// Logical grouping used by the document export and interactive layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Crew,
    Arrest,
    EmsTimes,
    Resuscitation,
    MedicationDoses,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Crew,
        Section::Arrest,
        Section::EmsTimes,
        Section::Resuscitation,
        Section::MedicationDoses,
    ];

    /// Heading printed above the section in the document export.
    pub fn title(self) -> &'static str {
        match self {
            Self::Crew => "EMS & Crew",
            Self::Arrest => "Arrest & CPR Details",
            Self::EmsTimes => "EMS TIMES",
            Self::Resuscitation => "Resuscitation Details",
            Self::MedicationDoses => "Medication Doses (EMS / First Responders)",
        }
    }

    /// Fields printed in this section, in document order.
    ///
    /// Document order is not tabular order: the initial rhythm and shock
    /// count print next to the CPR start time, while the tabular layout
    /// keeps them in declared order. `WantFollowUp` and `FollowUpEmail`
    /// are absent here — the follow-up email renders in the title block.
    pub fn document_fields(self) -> &'static [Field] {
        match self {
            Self::Crew => &[
                Field::EmsAgency,
                Field::CrewNumber,
                Field::CrewNamesPhones,
                Field::RunNumber,
            ],
            Self::Arrest => &[
                Field::WitnessedArrest,
                Field::TimeOfArrest,
                Field::BystanderCpr,
                Field::BysCprStart,
                Field::FirstResponderCpr,
                Field::FirstResponderOnScene,
                Field::DownTimePriorToCpr,
                Field::AedShocksPrior,
                Field::AedShocksNumber,
            ],
            Self::EmsTimes => &[
                Field::Dispatched,
                Field::Enroute,
                Field::OnScene,
                Field::LeaveScene,
                Field::ArriveHospital,
            ],
            Self::Resuscitation => &[
                Field::LucasOn,
                Field::EmsCprStartTime,
                Field::InitialRhythmEms,
                Field::EmsShocksNumber,
                Field::Airway,
                Field::IntubationIssues,
                Field::Utilized302,
                Field::ResQpod,
                Field::LastEtco2,
            ],
            Self::MedicationDoses => &[
                Field::DoseEpinephrine,
                Field::DoseAmiodarone,
                Field::DoseLidocaine,
                Field::DoseSodiumBicarbonate,
                Field::DoseOther,
            ],
        }
    }
}

/// Typed identifier for every field on the intake sheet.
///
/// `ALL` is the declared order: it fixes the tabular column order and
/// the submission payload key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    EmsAgency,
    CrewNumber,
    WantFollowUp,
    CrewNamesPhones,
    FollowUpEmail,
    RunNumber,
    WitnessedArrest,
    TimeOfArrest,
    BystanderCpr,
    BysCprStart,
    FirstResponderCpr,
    FirstResponderOnScene,
    DownTimePriorToCpr,
    AedShocksPrior,
    AedShocksNumber,
    Dispatched,
    Enroute,
    OnScene,
    LeaveScene,
    ArriveHospital,
    LucasOn,
    EmsCprStartTime,
    Airway,
    IntubationIssues,
    Utilized302,
    ResQpod,
    LastEtco2,
    DoseEpinephrine,
    DoseAmiodarone,
    DoseLidocaine,
    DoseSodiumBicarbonate,
    DoseOther,
    InitialRhythmEms,
    EmsShocksNumber,
}

/// Choices the interactive layer offers for the airway field.
pub const AIRWAY_OPTIONS: &[&str] = &["iGel", "King-LT", "LMA", "ETT", "BVM"];

impl Field {
    pub const ALL: [Field; 34] = [
        Field::EmsAgency,
        Field::CrewNumber,
        Field::WantFollowUp,
        Field::CrewNamesPhones,
        Field::FollowUpEmail,
        Field::RunNumber,
        Field::WitnessedArrest,
        Field::TimeOfArrest,
        Field::BystanderCpr,
        Field::BysCprStart,
        Field::FirstResponderCpr,
        Field::FirstResponderOnScene,
        Field::DownTimePriorToCpr,
        Field::AedShocksPrior,
        Field::AedShocksNumber,
        Field::Dispatched,
        Field::Enroute,
        Field::OnScene,
        Field::LeaveScene,
        Field::ArriveHospital,
        Field::LucasOn,
        Field::EmsCprStartTime,
        Field::Airway,
        Field::IntubationIssues,
        Field::Utilized302,
        Field::ResQpod,
        Field::LastEtco2,
        Field::DoseEpinephrine,
        Field::DoseAmiodarone,
        Field::DoseLidocaine,
        Field::DoseSodiumBicarbonate,
        Field::DoseOther,
        Field::InitialRhythmEms,
        Field::EmsShocksNumber,
    ];

    /// Wire key: tabular column header and submission payload key.
    pub fn key(self) -> &'static str {
        match self {
            Self::EmsAgency => "emsAgency",
            Self::CrewNumber => "crewNumber",
            Self::WantFollowUp => "wantFollowUp",
            Self::CrewNamesPhones => "crewNamesPhones",
            Self::FollowUpEmail => "followUpEmail",
            Self::RunNumber => "runNumber",
            Self::WitnessedArrest => "witnessedArrest",
            Self::TimeOfArrest => "timeOfArrest",
            Self::BystanderCpr => "bystanderCPR",
            Self::BysCprStart => "bysCPRStart",
            Self::FirstResponderCpr => "firstResponderCPR",
            Self::FirstResponderOnScene => "firstResponderOnScene",
            Self::DownTimePriorToCpr => "downTimePriorToCPR",
            Self::AedShocksPrior => "aedShocksPrior",
            Self::AedShocksNumber => "aedShocksNumber",
            Self::Dispatched => "dispatched",
            Self::Enroute => "enroute",
            Self::OnScene => "onScene",
            Self::LeaveScene => "leaveScene",
            Self::ArriveHospital => "arriveHospital",
            Self::LucasOn => "lucasOn",
            Self::EmsCprStartTime => "emsCPRStartTime",
            Self::Airway => "airway",
            Self::IntubationIssues => "intubationIssues",
            Self::Utilized302 => "utilized302",
            Self::ResQpod => "resQpod",
            Self::LastEtco2 => "lastETCO2",
            Self::DoseEpinephrine => "doseEpinephrine",
            Self::DoseAmiodarone => "doseAmiodarone",
            Self::DoseLidocaine => "doseLidocaine",
            Self::DoseSodiumBicarbonate => "doseSodiumBicarbonate",
            Self::DoseOther => "doseOther",
            Self::InitialRhythmEms => "initialRhythmEMS",
            Self::EmsShocksNumber => "emsShocksNumber",
        }
    }

    /// Label shown next to the value in the document export.
    pub fn label(self) -> &'static str {
        match self {
            Self::EmsAgency => "Transporting EMS agency",
            Self::CrewNumber => "Crew #",
            Self::WantFollowUp => "Provide follow-up contact?",
            Self::CrewNamesPhones => "Crew Names & Phone #",
            Self::FollowUpEmail => "Follow-up email",
            Self::RunNumber => "Run/incident #",
            Self::WitnessedArrest => "Witnessed Arrest?",
            Self::TimeOfArrest => "Time of Arrest",
            Self::BystanderCpr => "Bystander CPR?",
            Self::BysCprStart => "Bystander CPR start time",
            Self::FirstResponderCpr => "First Responder CPR?",
            Self::FirstResponderOnScene => "First responder on scene time",
            Self::DownTimePriorToCpr => "Approx. Down Time prior to CPR",
            Self::AedShocksPrior => "AED Shocks prior to EMS Arrival?",
            Self::AedShocksNumber => "Number of AED Shocks",
            Self::Dispatched => "Dispatched",
            Self::Enroute => "Enroute",
            Self::OnScene => "On Scene",
            Self::LeaveScene => "Leave Scene",
            Self::ArriveHospital => "Arrive Hospital",
            Self::LucasOn => "LUCAS on?",
            Self::EmsCprStartTime => "EMS CPR/LUCAS start time",
            Self::Airway => "Airway utilized",
            Self::IntubationIssues => "Intubation issues",
            Self::Utilized302 => "Utilized 30:2?",
            Self::ResQpod => "ResQPOD?",
            Self::LastEtco2 => "Last ETCO2 for EMS",
            Self::DoseEpinephrine => "Epinephrine (mg or mcg)",
            Self::DoseAmiodarone => "Amiodarone (mg)",
            Self::DoseLidocaine => "Lidocaine (mg)",
            Self::DoseSodiumBicarbonate => "Sodium Bicarbonate (mEq)",
            Self::DoseOther => "Other (name & dose)",
            Self::InitialRhythmEms => "Initial Rhythm for EMS",
            Self::EmsShocksNumber => "Number of EMS Shocks",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::WantFollowUp
            | Self::WitnessedArrest
            | Self::BystanderCpr
            | Self::FirstResponderCpr
            | Self::AedShocksPrior
            | Self::LucasOn
            | Self::Utilized302
            | Self::ResQpod => FieldKind::YesNo,
            Self::TimeOfArrest
            | Self::BysCprStart
            | Self::FirstResponderOnScene
            | Self::Dispatched
            | Self::Enroute
            | Self::OnScene
            | Self::LeaveScene
            | Self::ArriveHospital
            | Self::EmsCprStartTime => FieldKind::Time,
            _ => FieldKind::Text,
        }
    }

    pub fn section(self) -> Section {
        match self {
            Self::EmsAgency
            | Self::CrewNumber
            | Self::WantFollowUp
            | Self::CrewNamesPhones
            | Self::FollowUpEmail
            | Self::RunNumber => Section::Crew,
            Self::WitnessedArrest
            | Self::TimeOfArrest
            | Self::BystanderCpr
            | Self::BysCprStart
            | Self::FirstResponderCpr
            | Self::FirstResponderOnScene
            | Self::DownTimePriorToCpr
            | Self::AedShocksPrior
            | Self::AedShocksNumber => Section::Arrest,
            Self::Dispatched
            | Self::Enroute
            | Self::OnScene
            | Self::LeaveScene
            | Self::ArriveHospital => Section::EmsTimes,
            Self::LucasOn
            | Self::EmsCprStartTime
            | Self::Airway
            | Self::IntubationIssues
            | Self::Utilized302
            | Self::ResQpod
            | Self::LastEtco2
            | Self::InitialRhythmEms
            | Self::EmsShocksNumber => Section::Resuscitation,
            Self::DoseEpinephrine
            | Self::DoseAmiodarone
            | Self::DoseLidocaine
            | Self::DoseSodiumBicarbonate
            | Self::DoseOther => Section::MedicationDoses,
        }
    }

    /// Controlling tri-state for conditional fields.
    ///
    /// A field with a parent is only meaningful while the parent answer
    /// is exactly `Yes`; see the `visibility` module.
    pub fn parent(self) -> Option<Field> {
        match self {
            Self::CrewNamesPhones | Self::FollowUpEmail => Some(Field::WantFollowUp),
            Self::BysCprStart => Some(Field::BystanderCpr),
            Self::FirstResponderOnScene => Some(Field::FirstResponderCpr),
            Self::AedShocksNumber => Some(Field::AedShocksPrior),
            _ => None,
        }
    }
}

// ─── FieldValue ───────────────────────────────────────────────────────────────

/// A single field's value, typed by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Free text or time-of-day text.
    Text(String),
    /// Tri-state answer.
    Answer(TriState),
}

// ─── FormRecord ───────────────────────────────────────────────────────────────

/// The record for one in-progress submission.
///
/// Created fully empty (all text `""`, all answers unanswered); mutated
/// field-by-field; snapshotted (cloned) at export/submission time so
/// later edits cannot bleed into an already-initiated operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormRecord {
    pub ems_agency: String,
    pub crew_number: String,
    pub want_follow_up: TriState,
    pub crew_names_phones: String,
    pub follow_up_email: String,
    pub run_number: String,
    pub witnessed_arrest: TriState,
    pub time_of_arrest: String,
    pub bystander_cpr: TriState,
    pub bys_cpr_start: String,
    pub first_responder_cpr: TriState,
    pub first_responder_on_scene: String,
    pub down_time_prior_to_cpr: String,
    pub aed_shocks_prior: TriState,
    pub aed_shocks_number: String,
    pub dispatched: String,
    pub enroute: String,
    pub on_scene: String,
    pub leave_scene: String,
    pub arrive_hospital: String,
    pub lucas_on: TriState,
    pub ems_cpr_start_time: String,
    pub airway: String,
    pub intubation_issues: String,
    pub utilized_30_2: TriState,
    pub res_qpod: TriState,
    pub last_etco2: String,
    pub dose_epinephrine: String,
    pub dose_amiodarone: String,
    pub dose_lidocaine: String,
    pub dose_sodium_bicarbonate: String,
    pub dose_other: String,
    pub initial_rhythm_ems: String,
    pub ems_shocks_number: String,
}

impl FormRecord {
    /// A fresh, fully empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Immutable copy for export/submission.
    pub fn snapshot(&self) -> FormRecord {
        self.clone()
    }

    /// Text value of a text/time field. `None` for tri-state fields.
    pub fn text(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::EmsAgency => &self.ems_agency,
            Field::CrewNumber => &self.crew_number,
            Field::CrewNamesPhones => &self.crew_names_phones,
            Field::FollowUpEmail => &self.follow_up_email,
            Field::RunNumber => &self.run_number,
            Field::TimeOfArrest => &self.time_of_arrest,
            Field::BysCprStart => &self.bys_cpr_start,
            Field::FirstResponderOnScene => &self.first_responder_on_scene,
            Field::DownTimePriorToCpr => &self.down_time_prior_to_cpr,
            Field::AedShocksNumber => &self.aed_shocks_number,
            Field::Dispatched => &self.dispatched,
            Field::Enroute => &self.enroute,
            Field::OnScene => &self.on_scene,
            Field::LeaveScene => &self.leave_scene,
            Field::ArriveHospital => &self.arrive_hospital,
            Field::EmsCprStartTime => &self.ems_cpr_start_time,
            Field::Airway => &self.airway,
            Field::IntubationIssues => &self.intubation_issues,
            Field::LastEtco2 => &self.last_etco2,
            Field::DoseEpinephrine => &self.dose_epinephrine,
            Field::DoseAmiodarone => &self.dose_amiodarone,
            Field::DoseLidocaine => &self.dose_lidocaine,
            Field::DoseSodiumBicarbonate => &self.dose_sodium_bicarbonate,
            Field::DoseOther => &self.dose_other,
            Field::InitialRhythmEms => &self.initial_rhythm_ems,
            Field::EmsShocksNumber => &self.ems_shocks_number,
            _ => return None,
        };
        Some(value)
    }

    /// Answer of a tri-state field. `None` for text/time fields.
    pub fn answer(&self, field: Field) -> Option<TriState> {
        match field {
            Field::WantFollowUp => Some(self.want_follow_up),
            Field::WitnessedArrest => Some(self.witnessed_arrest),
            Field::BystanderCpr => Some(self.bystander_cpr),
            Field::FirstResponderCpr => Some(self.first_responder_cpr),
            Field::AedShocksPrior => Some(self.aed_shocks_prior),
            Field::LucasOn => Some(self.lucas_on),
            Field::Utilized302 => Some(self.utilized_30_2),
            Field::ResQpod => Some(self.res_qpod),
            _ => None,
        }
    }

    /// Current value of any field.
    pub fn get(&self, field: Field) -> FieldValue {
        match field.kind() {
            FieldKind::Text | FieldKind::Time => {
                FieldValue::Text(self.text(field).unwrap_or_default().to_string())
            }
            FieldKind::YesNo => {
                FieldValue::Answer(self.answer(field).unwrap_or(TriState::Unanswered))
            }
        }
    }

    /// Set a field. Accepts any value of the field's kind without
    /// validation; a value of the wrong kind is ignored with a warning.
    pub fn set(&mut self, field: Field, value: FieldValue) {
        match value {
            FieldValue::Text(text) => match self.text_slot(field) {
                Some(slot) => *slot = text,
                None => tracing::warn!(field = field.key(), "text value for yes/no field ignored"),
            },
            FieldValue::Answer(answer) => match self.answer_slot(field) {
                Some(slot) => *slot = answer,
                None => tracing::warn!(field = field.key(), "answer for text field ignored"),
            },
        }
    }

    /// Set a text/time field.
    pub fn set_text(&mut self, field: Field, value: impl Into<String>) {
        self.set(field, FieldValue::Text(value.into()));
    }

    /// Set a tri-state field.
    pub fn set_answer(&mut self, field: Field, value: impl Into<TriState>) {
        self.set(field, FieldValue::Answer(value.into()));
    }

    /// Clear every field back to the empty state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// JSON value of a field as the submission payload carries it:
    /// strings verbatim, tri-states as `null`/`false`/`true`.
    pub fn json_value(&self, field: Field) -> serde_json::Value {
        match self.get(field) {
            FieldValue::Text(text) => serde_json::Value::String(text),
            FieldValue::Answer(answer) => match answer.as_option() {
                Some(b) => serde_json::Value::Bool(b),
                None => serde_json::Value::Null,
            },
        }
    }

    fn text_slot(&mut self, field: Field) -> Option<&mut String> {
        let slot = match field {
            Field::EmsAgency => &mut self.ems_agency,
            Field::CrewNumber => &mut self.crew_number,
            Field::CrewNamesPhones => &mut self.crew_names_phones,
            Field::FollowUpEmail => &mut self.follow_up_email,
            Field::RunNumber => &mut self.run_number,
            Field::TimeOfArrest => &mut self.time_of_arrest,
            Field::BysCprStart => &mut self.bys_cpr_start,
            Field::FirstResponderOnScene => &mut self.first_responder_on_scene,
            Field::DownTimePriorToCpr => &mut self.down_time_prior_to_cpr,
            Field::AedShocksNumber => &mut self.aed_shocks_number,
            Field::Dispatched => &mut self.dispatched,
            Field::Enroute => &mut self.enroute,
            Field::OnScene => &mut self.on_scene,
            Field::LeaveScene => &mut self.leave_scene,
            Field::ArriveHospital => &mut self.arrive_hospital,
            Field::EmsCprStartTime => &mut self.ems_cpr_start_time,
            Field::Airway => &mut self.airway,
            Field::IntubationIssues => &mut self.intubation_issues,
            Field::LastEtco2 => &mut self.last_etco2,
            Field::DoseEpinephrine => &mut self.dose_epinephrine,
            Field::DoseAmiodarone => &mut self.dose_amiodarone,
            Field::DoseLidocaine => &mut self.dose_lidocaine,
            Field::DoseSodiumBicarbonate => &mut self.dose_sodium_bicarbonate,
            Field::DoseOther => &mut self.dose_other,
            Field::InitialRhythmEms => &mut self.initial_rhythm_ems,
            Field::EmsShocksNumber => &mut self.ems_shocks_number,
            _ => return None,
        };
        Some(slot)
    }

    fn answer_slot(&mut self, field: Field) -> Option<&mut TriState> {
        let slot = match field {
            Field::WantFollowUp => &mut self.want_follow_up,
            Field::WitnessedArrest => &mut self.witnessed_arrest,
            Field::BystanderCpr => &mut self.bystander_cpr,
            Field::FirstResponderCpr => &mut self.first_responder_cpr,
            Field::AedShocksPrior => &mut self.aed_shocks_prior,
            Field::LucasOn => &mut self.lucas_on,
            Field::Utilized302 => &mut self.utilized_30_2,
            Field::ResQpod => &mut self.res_qpod,
            _ => return None,
        };
        Some(slot)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
