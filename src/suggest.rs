//! Autocomplete suggestions for the equipment and reference fields
//!
//! Suggestions are advisory: the fields accept any free text.

/// An entry of a fixed suggestion list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub const EQUIPMENT_OPTIONS: &[SuggestionOption] = &[
    SuggestionOption { value: "casco", label: "Casco" },
    SuggestionOption { value: "guantes", label: "Guantes" },
    SuggestionOption { value: "botas", label: "Botas" },
    SuggestionOption { value: "chaleco", label: "Chaleco Reflectivo" },
];

pub const REFERENCE_OPTIONS: &[SuggestionOption] = &[
    SuggestionOption { value: "orden_trabajo", label: "Orden de Trabajo" },
    SuggestionOption { value: "requerimiento", label: "Requerimiento Interno" },
    SuggestionOption { value: "solicitud", label: "Solicitud de EPP" },
];

/// Options whose label contains `input`, ignoring case, in list order
pub fn filter(options: &'static [SuggestionOption], input: &str) -> Vec<SuggestionOption> {
    let needle = input.to_lowercase();
    options
        .iter()
        .filter(|opt| opt.label.to_lowercase().contains(&needle))
        .copied()
        .collect()
}

/// A suggestion list that tracks the currently visible subset
#[derive(Debug, Clone)]
pub struct Suggestions {
    options: &'static [SuggestionOption],
    visible: Vec<SuggestionOption>,
}

impl Suggestions {
    pub fn new(options: &'static [SuggestionOption]) -> Self {
        Self {
            options,
            visible: options.to_vec(),
        }
    }

    pub fn equipment() -> Self {
        Self::new(EQUIPMENT_OPTIONS)
    }

    pub fn reference() -> Self {
        Self::new(REFERENCE_OPTIONS)
    }

    /// Refilter against the current field text
    pub fn update(&mut self, input: &str) {
        self.visible = filter(self.options, input);
    }

    pub fn reset(&mut self) {
        self.visible = self.options.to_vec();
    }

    pub fn visible(&self) -> &[SuggestionOption] {
        &self.visible
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.visible.iter().map(|opt| opt.label).collect()
    }
}
