//! User-visible notices produced by view actions

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

impl NoticeLevel {
    pub fn title(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "Éxito",
            NoticeLevel::Error => "Error",
        }
    }
}

/// A message the front end should surface to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.level.title()
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_display() {
        let notice = Notice::error("Trabajador no encontrado");
        assert_eq!(notice.to_string(), "Error: Trabajador no encontrado");
        assert!(notice.is_error());

        let notice = Notice::success("Listo");
        assert_eq!(notice.title(), "Éxito");
        assert!(!notice.is_error());
    }
}
