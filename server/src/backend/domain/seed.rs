//! Initial workbook contents for a new appraisal session.

use shared::{
    AgriculturalRowInput, AssetRowInput, BeefRowInput, DairyRowInput, HerdRowInput, HerdSex,
    HistoricalRowInput, PriceRowInput, RowInput,
};

const QUOTE_DATE: &str = "2025-08-06";
const QUOTE_SOURCE: &str = "CONAB";
const QUOTE_MUNICIPALITY: &str = "AREADO";
const QUOTE_STATE: &str = "MG";

const HERD_AGE_BANDS: [(&str, u32, u32); 4] = [
    ("De 0 até 12 meses", 0, 4),
    ("De 13 até 24 meses", 0, 5),
    ("De 25 até 36 meses", 1, 0),
    ("Acima de 36 meses", 0, 3),
];

fn price(key: &str, value: f64) -> PriceRowInput {
    PriceRowInput {
        key: key.to_string(),
        quote_date: QUOTE_DATE.to_string(),
        source: QUOTE_SOURCE.to_string(),
        state: QUOTE_STATE.to_string(),
        municipality: QUOTE_MUNICIPALITY.to_string(),
        value,
    }
}

fn agricultural(period: &str, key: &str, area: f64, yield_per_area: f64) -> AgriculturalRowInput {
    AgriculturalRowInput {
        period: period.to_string(),
        activity_key: key.to_string(),
        unit: String::new(),
        area,
        yield_per_area,
    }
}

fn historical(
    period: &str,
    key: &str,
    area: f64,
    yield_per_area: f64,
    recorded_quantity: f64,
    recorded_value: f64,
) -> HistoricalRowInput {
    HistoricalRowInput {
        period: period.to_string(),
        activity_key: key.to_string(),
        area,
        yield_per_area,
        recorded_quantity,
        recorded_value,
    }
}

fn asset(description: &str, model: &str, year: &str, color: &str, value: f64) -> AssetRowInput {
    AssetRowInput {
        description: description.to_string(),
        model: model.to_string(),
        year: year.to_string(),
        color: color.to_string(),
        value,
    }
}

/// Seed rows in insertion order. Prices come first so every dependent row
/// is priced on the first pass. The diverse-crop table starts empty.
pub fn seed_rows() -> Vec<RowInput> {
    let mut rows = vec![
        RowInput::Prices(price("CAFÉ ARÁBICA", 1755.0)),
        RowInput::Prices(price("MILHO", 63.0)),
        RowInput::Prices(price("BOVINOCULTURA DE CORTE", 282.94)),
        RowInput::Agricultural(agricultural("2025 / 2026", "CAFÉ ARÁBICA", 1.31, 32.0)),
        RowInput::Agricultural(agricultural("2025 / 2026", "MILHO", 2.0, 50.0)),
        RowInput::Beef(BeefRowInput {
            period: "2025".to_string(),
            activity_key: "BOVINOCULTURA DE CORTE".to_string(),
            unit: String::new(),
            animal_units_per_ha: 5.0,
            usable_area: 2.6,
            head_count: 13.0,
            unit_weight: 17.0,
        }),
        RowInput::Dairy(DairyRowInput {
            period: "2025".to_string(),
            activity_label: "PECUÁRIA LEITEIRA".to_string(),
            liters_per_day: 18.0,
            usable_area: 3.5,
            cow_count: 20,
        }),
        RowInput::Historical(historical("2024 / 2025", "CAFÉ ARÁBICA", 1.31, 29.0, 37.99, 66672.45)),
        RowInput::Historical(historical("2025 / 2026", "CAFÉ ARÁBICA", 1.31, 32.0, 41.92, 73569.60)),
        RowInput::Historical(historical("2024 / 2025", "MILHO", 2.0, 50.0, 100.0, 6300.0)),
        RowInput::Historical(historical("2025 / 2026", "MILHO", 2.0, 50.0, 100.0, 6300.0)),
    ];

    for (age_band, males, females) in HERD_AGE_BANDS {
        for (sex, quantity) in [(HerdSex::Male, males), (HerdSex::Female, females)] {
            rows.push(RowInput::Herd(HerdRowInput {
                age_band: age_band.to_string(),
                sex,
                quantity,
                unit_value: 0.0,
            }));
        }
    }

    rows.extend(
        [
            asset("TRATOR - SOLIS 26 4WD", "SOLIS26/GTRA4WD", "2022", "VERMELHO", 107000.0),
            asset("ADUBADEIRA", "M535B/MINAMI", "2022", "LARANJA", 21000.0),
            asset("PULVERIZADOR", "KUHN/ AF600", "2023", "CINZA/LARANJA", 32375.0),
            asset("ROCHADEIRA", "AT8160", "2020", "VERMELHA", 15000.0),
        ]
        .into_iter()
        .map(RowInput::Assets),
    );

    rows
}
