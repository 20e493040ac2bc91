use crate::metrics::{InstrumentKind, NumberKind, Unit};

/// Descriptor contains all the settings that describe an instrument,
/// including its name, owning namespace, metric kind, number kind, and the
/// configurable options.
#[derive(Clone, Debug, PartialEq)]
pub struct Descriptor {
    name: String,
    namespace: String,
    instrument_kind: InstrumentKind,
    number_kind: NumberKind,
    description: Option<String>,
    unit: Option<Unit>,
}

impl Descriptor {
    /// Create a new descriptor.
    pub fn new(
        name: String,
        namespace: String,
        instrument_kind: InstrumentKind,
        number_kind: NumberKind,
    ) -> Self {
        Descriptor {
            name,
            namespace,
            instrument_kind,
            number_kind,
            description: None,
            unit: None,
        }
    }

    /// The metric instrument's name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The namespace (library name) of the meter that owns this instrument.
    pub fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    /// The specific kind of instrument.
    pub fn instrument_kind(&self) -> &InstrumentKind {
        &self.instrument_kind
    }

    /// Whether this instrument is declared over i64 or f64 values.
    pub fn number_kind(&self) -> &NumberKind {
        &self.number_kind
    }

    /// A human-readable description of the metric instrument.
    pub fn description(&self) -> Option<&String> {
        self.description.as_ref()
    }

    /// Assign a new description.
    pub fn set_description(&mut self, description: String) {
        self.description = Some(description);
    }

    /// Unit describes the units of the metric instrument.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_ref().map(|unit| unit.as_ref())
    }

    /// Assign a new unit.
    pub fn set_unit(&mut self, unit: Unit) {
        self.unit = Some(unit);
    }
}
