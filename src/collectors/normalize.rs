use crate::collectors::{RawId, RawPosting};
use crate::error::AppError;
use crate::models::vacancy::Vacancy;

/// Map one raw posting onto the stored vacancy shape.
///
/// Salary bounds are never left null: a posting without a salary block gets
/// `0..0` in an empty currency, and a block missing one bound gets 0 there.
/// A missing responsibility snippet becomes an empty description.
pub fn normalize(raw: &RawPosting) -> Result<Vacancy, AppError> {
    let hh_vacancy_id = parse_id(raw.id.as_ref(), "id")?;

    let employer = raw
        .employer
        .as_ref()
        .ok_or_else(|| missing(raw, "employer"))?;
    let hh_company_id = parse_id(employer.id.as_ref(), "employer.id")?;
    let company_name = employer
        .name
        .clone()
        .ok_or_else(|| missing(raw, "employer.name"))?;

    let title = raw.name.clone().ok_or_else(|| missing(raw, "name"))?;
    let url = raw
        .alternate_url
        .clone()
        .ok_or_else(|| missing(raw, "alternate_url"))?;

    let (salary_from, salary_to, currency) = match &raw.salary_range {
        Some(salary) => (
            salary.from.unwrap_or(0),
            salary.to.unwrap_or(0),
            salary.currency.clone(),
        ),
        None => (0, 0, Some(String::new())),
    };

    let description = raw
        .snippet
        .as_ref()
        .and_then(|s| s.responsibility.clone())
        .unwrap_or_default();

    Ok(Vacancy {
        hh_vacancy_id,
        hh_company_id,
        company_name,
        title,
        salary_from: Some(salary_from),
        salary_to: Some(salary_to),
        currency,
        url,
        description,
    })
}

fn parse_id(id: Option<&RawId>, field: &str) -> Result<i32, AppError> {
    let parsed = match id {
        Some(RawId::Number(n)) => i32::try_from(*n).ok(),
        Some(RawId::Text(s)) => s.trim().parse::<i32>().ok(),
        None => return Err(AppError::Validation(format!("Posting has no '{field}'"))),
    };
    parsed.ok_or_else(|| {
        AppError::Validation(format!("Posting '{field}' is not an integer id: {id:?}"))
    })
}

fn missing(raw: &RawPosting, field: &str) -> AppError {
    AppError::Validation(format!("Posting {:?} has no '{field}'", raw.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(json: serde_json::Value) -> RawPosting {
        serde_json::from_value(json).unwrap()
    }

    fn full_posting() -> serde_json::Value {
        serde_json::json!({
            "id": "93354061",
            "name": "Backend Python Developer",
            "employer": { "id": "1740", "name": "Yandex" },
            "salary_range": { "from": 150000, "to": 250000, "currency": "RUR" },
            "alternate_url": "https://hh.ru/vacancy/93354061",
            "snippet": { "responsibility": "Build services. Knowledge of Python required." }
        })
    }

    #[test]
    fn full_posting_is_mapped_field_by_field() {
        let vacancy = normalize(&posting(full_posting())).unwrap();
        assert_eq!(vacancy.hh_vacancy_id, 93354061);
        assert_eq!(vacancy.hh_company_id, 1740);
        assert_eq!(vacancy.company_name, "Yandex");
        assert_eq!(vacancy.title, "Backend Python Developer");
        assert_eq!(vacancy.salary_from, Some(150000));
        assert_eq!(vacancy.salary_to, Some(250000));
        assert_eq!(vacancy.currency.as_deref(), Some("RUR"));
        assert_eq!(vacancy.url, "https://hh.ru/vacancy/93354061");
        assert_eq!(
            vacancy.description,
            "Build services. Knowledge of Python required."
        );
    }

    #[test]
    fn missing_salary_block_becomes_zero_in_empty_currency() {
        let mut json = full_posting();
        json.as_object_mut().unwrap().remove("salary_range");
        let vacancy = normalize(&posting(json)).unwrap();
        assert_eq!(vacancy.salary_from, Some(0));
        assert_eq!(vacancy.salary_to, Some(0));
        assert_eq!(vacancy.currency.as_deref(), Some(""));
    }

    #[test]
    fn null_salary_block_is_treated_as_missing() {
        let mut json = full_posting();
        json["salary_range"] = serde_json::Value::Null;
        let vacancy = normalize(&posting(json)).unwrap();
        assert_eq!((vacancy.salary_from, vacancy.salary_to), (Some(0), Some(0)));
        assert_eq!(vacancy.currency.as_deref(), Some(""));
    }

    #[test]
    fn missing_bound_defaults_to_zero_not_null() {
        let mut json = full_posting();
        json["salary_range"] = serde_json::json!({ "from": 90000, "to": null, "currency": "RUR" });
        let vacancy = normalize(&posting(json)).unwrap();
        assert_eq!(vacancy.salary_from, Some(90000));
        assert_eq!(vacancy.salary_to, Some(0));

        let mut json = full_posting();
        json["salary_range"] = serde_json::json!({ "to": 120000, "currency": "RUR" });
        let vacancy = normalize(&posting(json)).unwrap();
        assert_eq!(vacancy.salary_from, Some(0));
        assert_eq!(vacancy.salary_to, Some(120000));
    }

    #[test]
    fn missing_snippet_becomes_empty_description() {
        let mut json = full_posting();
        json["snippet"] = serde_json::json!({ "responsibility": null });
        assert_eq!(normalize(&posting(json)).unwrap().description, "");

        let mut json = full_posting();
        json.as_object_mut().unwrap().remove("snippet");
        assert_eq!(normalize(&posting(json)).unwrap().description, "");
    }

    #[test]
    fn numeric_ids_are_accepted() {
        let mut json = full_posting();
        json["id"] = serde_json::json!(42);
        json["employer"]["id"] = serde_json::json!(3529);
        let vacancy = normalize(&posting(json)).unwrap();
        assert_eq!((vacancy.hh_vacancy_id, vacancy.hh_company_id), (42, 3529));
    }

    #[test]
    fn required_fields_are_enforced() {
        for field in ["id", "name", "employer", "alternate_url"] {
            let mut json = full_posting();
            json.as_object_mut().unwrap().remove(field);
            let err = normalize(&posting(json)).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{field}");
        }

        let mut json = full_posting();
        json["employer"].as_object_mut().unwrap().remove("name");
        assert!(normalize(&posting(json)).is_err());
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        let mut json = full_posting();
        json["id"] = serde_json::json!("vac-17");
        assert!(matches!(
            normalize(&posting(json)),
            Err(AppError::Validation(_))
        ));
    }
}
