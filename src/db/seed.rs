//! Reference data inserted by `init-db` into empty tables

use chrono::NaiveDate;
use log::info;
use sqlx::{Sqlite, Transaction};

use super::AppState;

const DEPARTMENTS: &[&str] = &["Основной цех", "Транспортный отдел", "Склад", "Отдел безопасности"];
const POSITIONS: &[&str] = &[
    "Водитель",
    "Механик",
    "Диспетчер",
    "Кладовщик",
    "Начальник отдела",
    "Специалист по безопасности",
];
const VEHICLE_TYPES: &[&str] = &["Легковой автомобиль", "Грузовой автомобиль", "Автобус", "Спецтехника"];
const VEHICLE_CATEGORIES: &[&str] = &["B", "C", "D", "E"];
const CITIES: &[&str] = &["Москва", "Санкт-Петербург", "Новосибирск", "Екатеринбург"];
const AIRPORTS: &[(&str, &str)] = &[
    ("Шереметьево (SVO)", "SVO"),
    ("Домодедово (DME)", "DME"),
    ("Внуково (VKO)", "VKO"),
    ("Пулково (LED)", "LED"),
];
const POSTS: &[(&str, &str)] = &[
    ("Пост №1 - Главный въезд", "Основной контрольно-пропускной пункт"),
    ("Пост №2 - Северный въезд", "Северный КПП"),
    ("Пост №3 - Южный въезд", "Южный КПП"),
    ("Пост №4 - Складская зона", "КПП складской территории"),
];
const AGREEMENT_PERSONS: &[(&str, &str, &str)] = &[
    (
        "Иванов Иван Иванович",
        "ООО 'Транспортная компания'",
        "Начальник отдела безопасности",
    ),
    ("Петров Петр Петрович", "АО 'Промышленный комплекс'", "Главный инженер"),
];
const INNS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "1234567890",
        "ООО 'Транспортная компания'",
        "Иванов Иван Иванович",
        "+7 (495) 123-45-67",
        "transport@mail.ru",
    ),
    (
        "0987654321",
        "АО 'Промышленный комплекс'",
        "Петров Петр Петрович",
        "+7 (495) 765-43-21",
        "industry@mail.ru",
    ),
];
const UNIFORM_TYPES: &[(&str, i64)] = &[
    ("Костюм рабочий", 12),
    ("Куртка утепленная", 24),
    ("Ботинки защитные", 12),
    ("Перчатки", 3),
    ("Каска", 36),
];

async fn is_empty(tx: &mut Transaction<'_, Sqlite>, table: &str) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(&mut **tx)
        .await?;
    Ok(count == 0)
}

async fn seed_names(
    tx: &mut Transaction<'_, Sqlite>,
    table: &str,
    names: &[&str],
) -> Result<(), sqlx::Error> {
    let sql = format!("INSERT INTO {} (name) VALUES (?)", table);
    for &name in names {
        sqlx::query(&sql).bind(name).execute(&mut **tx).await?;
    }
    Ok(())
}

impl AppState {
    /// Fills every empty reference table with its defaults in one
    /// transaction. Returns the tables that were seeded.
    pub async fn seed_defaults(&self) -> Result<Vec<&'static str>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut seeded = Vec::new();

        for (table, names) in [
            ("departments", DEPARTMENTS),
            ("positions", POSITIONS),
            ("vehicle_types", VEHICLE_TYPES),
            ("vehicle_categories", VEHICLE_CATEGORIES),
            ("cities", CITIES),
        ] {
            if is_empty(&mut tx, table).await? {
                seed_names(&mut tx, table, names).await?;
                seeded.push(table);
            }
        }

        if is_empty(&mut tx, "airports").await? {
            for &(name, code) in AIRPORTS {
                sqlx::query("INSERT INTO airports (name, code) VALUES (?, ?)")
                    .bind(name)
                    .bind(code)
                    .execute(&mut *tx)
                    .await?;
            }
            seeded.push("airports");
        }

        if is_empty(&mut tx, "posts").await? {
            for &(name, description) in POSTS {
                sqlx::query("INSERT INTO posts (name, description) VALUES (?, ?)")
                    .bind(name)
                    .bind(description)
                    .execute(&mut *tx)
                    .await?;
            }
            seeded.push("posts");
        }

        if is_empty(&mut tx, "agreement_persons").await? {
            for &(full_name, organization, position) in AGREEMENT_PERSONS {
                sqlx::query(
                    "INSERT INTO agreement_persons (full_name, organization, position) VALUES (?, ?, ?)",
                )
                .bind(full_name)
                .bind(organization)
                .bind(position)
                .execute(&mut *tx)
                .await?;
            }
            seeded.push("agreement_persons");
        }

        if is_empty(&mut tx, "contracts").await? {
            let contracts = [
                (
                    "ДГ-001/2024",
                    "Договор на транспортные услуги",
                    NaiveDate::from_ymd_opt(2024, 1, 15),
                    NaiveDate::from_ymd_opt(2024, 12, 31),
                    "ООО 'Промышленная компания'",
                ),
                (
                    "ДГ-002/2024",
                    "Договор подряда",
                    NaiveDate::from_ymd_opt(2024, 3, 1),
                    NaiveDate::from_ymd_opt(2024, 11, 30),
                    "АО 'Строительный комплекс'",
                ),
            ];
            for (number, name, start, end, customer) in contracts {
                sqlx::query(
                    "INSERT INTO contracts (number, name, start_date, end_date, customer) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(number)
                .bind(name)
                .bind(start)
                .bind(end)
                .bind(customer)
                .execute(&mut *tx)
                .await?;
            }
            seeded.push("contracts");
        }

        if is_empty(&mut tx, "organization_inns").await? {
            for &(inn, organization_name, contact_person, phone, email) in INNS {
                sqlx::query(
                    r#"
                    INSERT INTO organization_inns (inn, organization_name, contact_person, phone, email)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(inn)
                .bind(organization_name)
                .bind(contact_person)
                .bind(phone)
                .bind(email)
                .execute(&mut *tx)
                .await?;
            }
            seeded.push("organization_inns");
        }

        if is_empty(&mut tx, "uniform_types").await? {
            for &(name, wear_period) in UNIFORM_TYPES {
                sqlx::query("INSERT INTO uniform_types (name, wear_period) VALUES (?, ?)")
                    .bind(name)
                    .bind(wear_period)
                    .execute(&mut *tx)
                    .await?;
            }
            seeded.push("uniform_types");
        }

        tx.commit().await?;
        for table in &seeded {
            info!("Seeded default {}", table);
        }
        Ok(seeded)
    }
}
