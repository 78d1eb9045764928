use axum::http::{header, HeaderMap};

/// Locales the API can answer in. English is the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Uk,
}

impl Locale {
    /// Resolve the locale from the `Accept-Language` header. Only the first
    /// language tag is consulted; quality values are ignored.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(Self::parse)
            .unwrap_or_default()
    }

    fn parse(raw: &str) -> Self {
        let first = raw.split(',').next().unwrap_or("").trim();
        let primary = first.split(|c| c == '-' || c == ';').next().unwrap_or("");
        match primary.to_ascii_lowercase().as_str() {
            "uk" => Locale::Uk,
            _ => Locale::En,
        }
    }
}

/// Look up the user-facing text for a message key. Unknown keys fall back to
/// the key itself so a missing entry is visible instead of silent.
pub fn message(locale: Locale, key: &str) -> &str {
    let text = match locale {
        Locale::En => match key {
            "error.unauthorized" => "Authentication is required to access this resource",
            "error.unauthorized.credentials" => "Invalid login or password",
            "error.access_denied" => "Access denied",
            "error.entity_not_found" => "Requested entity was not found",
            "error.entity_exists" => "Entity with this login already exists",
            "error.role_exists" => "User already has this role",
            "error.role_not_present" => "User does not have this role",
            "error.unprocessable_json" => "Request body could not be parsed",
            "error.csv_file_required" => "Please upload a CSV file",
            "error.internal" => "Internal server error",
            "csv.exported" => "Data successfully written to file",
            "csv.imported" => "Users saved from CSV successfully",
            _ => "",
        },
        Locale::Uk => match key {
            "error.unauthorized" => "Для доступу до цього ресурсу потрібна автентифікація",
            "error.unauthorized.credentials" => "Невірний логін або пароль",
            "error.access_denied" => "Доступ заборонено",
            "error.entity_not_found" => "Запитаний запис не знайдено",
            "error.entity_exists" => "Запис з таким логіном вже існує",
            "error.role_exists" => "Користувач вже має цю роль",
            "error.role_not_present" => "Користувач не має цієї ролі",
            "error.unprocessable_json" => "Не вдалося розібрати тіло запиту",
            "error.csv_file_required" => "Будь ласка, завантажте CSV-файл",
            "error.internal" => "Внутрішня помилка сервера",
            "csv.exported" => "Дані успішно записано у файл",
            "csv.imported" => "Користувачів збережено з CSV",
            _ => "",
        },
    };
    if text.is_empty() {
        key
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parses_primary_language_tag() {
        assert_eq!(Locale::parse("uk"), Locale::Uk);
        assert_eq!(Locale::parse("uk-UA,uk;q=0.9,en;q=0.8"), Locale::Uk);
        assert_eq!(Locale::parse("en-US,en;q=0.5"), Locale::En);
        assert_eq!(Locale::parse("de-DE"), Locale::En);
        assert_eq!(Locale::parse(""), Locale::En);
    }

    #[test]
    fn missing_header_defaults_to_english() {
        let headers = HeaderMap::new();
        assert_eq!(Locale::from_headers(&headers), Locale::En);
    }

    #[test]
    fn reads_accept_language_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("uk-UA,uk;q=0.9"),
        );
        assert_eq!(Locale::from_headers(&headers), Locale::Uk);
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        assert_eq!(message(Locale::En, "error.nope"), "error.nope");
    }

    #[test]
    fn localizes_known_keys() {
        assert_eq!(
            message(Locale::En, "error.entity_not_found"),
            "Requested entity was not found"
        );
        assert_ne!(
            message(Locale::Uk, "error.entity_not_found"),
            message(Locale::En, "error.entity_not_found")
        );
    }
}
