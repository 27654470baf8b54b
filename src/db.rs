use anyhow::Context;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::error::FetchError;
use crate::models::{Day, RosterRow};
use crate::source;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let sheet = "Spring Session 2026";
    let rows: Vec<RosterRow> = [
        ("Avery Lee", "Preschool 5", "1", "5", "Moreno, Jules"),
        ("Kiara Patel", "Ed: Swimmer 3", "1", "8", "Moreno, Jules"),
        ("Noah Brooks", "Parent & Tot 2", "0", "4", "Patel, Sana"),
        ("Mila Chen", "Swimmer 6", "1", "11", "Patel, Sana, Moreno, Jules"),
        ("Owen Diaz", "Teen 2", "0", "14", "Okafor, Dele"),
        ("Ruby Evans", "Adult 3", "1", "36", "Okafor, Dele"),
    ]
    .into_iter()
    .map(|(name, level, pass_fail, age, monitor)| RosterRow {
        name: name.to_string(),
        current_level: level.to_string(),
        pass_fail: pass_fail.to_string(),
        age: age.to_string(),
        monitor: monitor.to_string(),
    })
    .collect();

    replace_roster(pool, sheet, Day::Saturday, &rows).await
}

pub async fn import_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
    sheet_name: &str,
    day: Day,
) -> anyhow::Result<usize> {
    let rows = source::read_csv_rows(csv_path)
        .with_context(|| format!("failed to read roster {}", csv_path.display()))?;
    replace_roster(pool, sheet_name, day, &rows).await
}

/// Replaces the stored roster for one sheet and day. Either every row lands
/// or the previous roster stays untouched.
pub async fn replace_roster(
    pool: &PgPool,
    sheet_name: &str,
    day: Day,
    rows: &[RosterRow],
) -> anyhow::Result<usize> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM prereg.roster_entries WHERE sheet_name = $1 AND day_name = $2")
        .bind(sheet_name)
        .bind(day.as_str())
        .execute(&mut *tx)
        .await?;

    let mut inserted = 0usize;
    for (index, row) in rows.iter().enumerate() {
        inserted += insert_row(&mut tx, sheet_name, day, index + 1, row).await?;
    }

    tx.commit().await?;
    Ok(inserted)
}

async fn insert_row(
    tx: &mut Transaction<'_, Postgres>,
    sheet_name: &str,
    day: Day,
    row_number: usize,
    row: &RosterRow,
) -> anyhow::Result<usize> {
    let source_key = format!("{sheet_name}:{day}:{row_number}");
    let row_number = i32::try_from(row_number).context("roster has too many rows")?;

    let result = sqlx::query(
        r#"
        INSERT INTO prereg.roster_entries
        (id, sheet_name, day_name, row_number, student_name, current_level, pass_fail, age, monitor, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(sheet_name)
    .bind(day.as_str())
    .bind(row_number)
    .bind(&row.name)
    .bind(&row.current_level)
    .bind(&row.pass_fail)
    .bind(&row.age)
    .bind(&row.monitor)
    .bind(source_key)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() as usize)
}

pub async fn list_sheets(pool: &PgPool) -> Result<Vec<String>, FetchError> {
    let rows = sqlx::query(
        "SELECT DISTINCT sheet_name FROM prereg.roster_entries ORDER BY sheet_name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.get("sheet_name")).collect())
}

pub async fn fetch_rows(
    pool: &PgPool,
    sheet_name: &str,
    day: Day,
) -> Result<Vec<RosterRow>, FetchError> {
    let records = sqlx::query(
        "SELECT student_name, current_level, pass_fail, age, monitor \
         FROM prereg.roster_entries \
         WHERE sheet_name = $1 AND day_name = $2 \
         ORDER BY row_number",
    )
    .bind(sheet_name)
    .bind(day.as_str())
    .fetch_all(pool)
    .await?;

    if records.is_empty() {
        return Err(FetchError::NotFound {
            sheet: sheet_name.to_string(),
            day: day.to_string(),
        });
    }

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        rows.push(RosterRow {
            name: record.get("student_name"),
            current_level: record.get("current_level"),
            pass_fail: record.get("pass_fail"),
            age: record.get("age"),
            monitor: record.get("monitor"),
        });
    }

    Ok(rows)
}
