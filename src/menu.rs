use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::db::Store;
use crate::error::AppError;
use crate::models::company::CompanyStats;
use crate::models::vacancy::{self, VacancyListing};

const MENU: &str = "Choose a menu item (for example, 2):
  1. Companies and their vacancy counts
  2. All vacancies
  3. Vacancies paying above the average salary
  4. Vacancies by keyword
  5. Exit";

const KEYWORD_PROMPT: &str = "Enter a keyword (for example, Python) or 0 to return to the menu:";

/// Characters stripped from both ends of every answer.
const ANSWER_TRIM: &[char] = &[' ', '.', ',', '!', '?', '"', '\n', '\r', '\t'];

pub fn render_company(company: &CompanyStats) -> String {
    format!(
        "Company {}: {}. Vacancies: {}.",
        company.hh_company_id, company.company_name, company.vacancy_count
    )
}

pub fn render_vacancy(vacancy: &VacancyListing) -> String {
    let salary = format!(
        "from {} to {} {}",
        vacancy.salary_from.unwrap_or(0),
        vacancy.salary_to.unwrap_or(0),
        vacancy.currency.as_deref().unwrap_or("")
    );
    format!(
        "Company: {}.\nPosition: {}.\nSalary: {}.\nLink: {}.\n",
        vacancy.company_name,
        vacancy.title,
        salary.trim_end(),
        vacancy.url.as_deref().unwrap_or("-")
    )
}

pub fn print_companies(out: &mut impl Write, companies: &[CompanyStats]) -> std::io::Result<()> {
    for company in companies {
        writeln!(out, "{}", render_company(company))?;
    }
    Ok(())
}

pub fn print_vacancies(out: &mut impl Write, vacancies: &[VacancyListing]) -> std::io::Result<()> {
    for vacancy in vacancies {
        writeln!(out, "{}", render_vacancy(vacancy))?;
    }
    Ok(())
}

/// Print the average salary followed by every vacancy above it.
pub async fn print_above_average(out: &mut impl Write, store: &Store) -> anyhow::Result<()> {
    let average = vacancy::average_salary(store).await?;
    let vacancies = VacancyListing::above_average(store).await?;
    writeln!(out, "Average salary across all vacancies: {average}.")?;
    print_vacancies(out, &vacancies)?;
    Ok(())
}

/// Print keyword matches, or a hint when there are none.
pub async fn print_keyword_matches(
    out: &mut impl Write,
    store: &Store,
    keyword: &str,
) -> anyhow::Result<()> {
    let vacancies = VacancyListing::by_keyword(store, keyword).await?;
    if vacancies.is_empty() {
        writeln!(
            out,
            "No vacancies found for '{keyword}'. Try a different keyword."
        )?;
    } else {
        print_vacancies(out, &vacancies)?;
    }
    Ok(())
}

/// Interactive loop over the four queries. A failed query is reported and
/// the menu is shown again; only choice 5 or end of input exits.
pub async fn run<R>(store: &Store, input: R, out: &mut impl Write) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        writeln!(out, "{MENU}")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let outcome = match line.trim_matches(ANSWER_TRIM) {
            "1" => match CompanyStats::list(store).await {
                Ok(companies) => print_companies(out, &companies).map_err(anyhow::Error::from),
                Err(e) => Err(e.into()),
            },
            "2" => match VacancyListing::all(store).await {
                Ok(vacancies) => print_vacancies(out, &vacancies).map_err(anyhow::Error::from),
                Err(e) => Err(e.into()),
            },
            "3" => print_above_average(out, store).await,
            "4" => {
                keyword_loop(store, &mut lines, out).await?;
                Ok(())
            }
            "5" => {
                writeln!(out, "Goodbye.")?;
                break;
            }
            other => {
                writeln!(out, "There is no menu item '{other}'. Enter a number from 1 to 5.")?;
                Ok(())
            }
        };

        if let Err(e) = outcome {
            report(out, &e)?;
        }
    }

    Ok(())
}

async fn keyword_loop<R>(
    store: &Store,
    lines: &mut tokio::io::Lines<R>,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        writeln!(out, "{KEYWORD_PROMPT}")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        let keyword = line.trim_matches(ANSWER_TRIM);
        if keyword == "0" {
            return Ok(());
        }
        if keyword.is_empty() {
            continue;
        }

        if let Err(e) = print_keyword_matches(out, store, keyword).await {
            report(out, &e)?;
            return Ok(());
        }
    }
}

fn report(out: &mut impl Write, error: &anyhow::Error) -> std::io::Result<()> {
    match error.downcast_ref::<AppError>() {
        Some(app) => tracing::error!(kind = ?app.kind(), "Query failed: {app}"),
        None => tracing::error!("Query failed: {error}"),
    }
    writeln!(out, "The database query failed: {error}")
}
