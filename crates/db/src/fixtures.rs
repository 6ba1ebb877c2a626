//! Deterministic demo catalog used by `casefit seed` and the smoke tests.

use rust_decimal::Decimal;

use casefit_core::domain::{
    Case, CaseId, DimensionUnit, Dimensions, Gear, GearId, ProtectionLevel, Weight, WeightUnit,
};
use casefit_core::repository::{CaseRepository, GearRepository, RepositoryError};

use crate::repositories::{SqlCaseRepository, SqlGearRepository};
use crate::DbPool;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedSummary {
    pub gear_seeded: usize,
    pub cases_seeded: usize,
}

struct GearSeed {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    gear_type: &'static str,
    dims: [f64; 3],
    weight_kg: f64,
    popularity: i64,
}

struct CaseSeed {
    id: &'static str,
    name: &'static str,
    brand: &'static str,
    internal: [f64; 3],
    external: Option<[f64; 3]>,
    weight_kg: f64,
    price: i64,
    rating: Option<f64>,
    review_count: i64,
    protection: ProtectionLevel,
    flags: [bool; 5], // waterproof, shockproof, handle, wheels, lock
    material: &'static str,
    color: &'static str,
    description: &'static str,
    features: &'static [&'static str],
}

const GEAR_SEEDS: &[GearSeed] = &[
    GearSeed {
        id: "gear-prophet-10",
        name: "Prophet-10 Analog Synth",
        category: "synthesizer",
        gear_type: "analog",
        dims: [40.5, 15.0, 5.5],
        weight_kg: 10.4,
        popularity: 88,
    },
    GearSeed {
        id: "gear-sp404",
        name: "SP-404 Sampler",
        category: "sampler",
        gear_type: "digital",
        dims: [7.0, 5.9, 2.8],
        weight_kg: 1.1,
        popularity: 95,
    },
    GearSeed {
        id: "gear-scarlett-4i4",
        name: "Scarlett 4i4 Interface",
        category: "audio interface",
        gear_type: "digital",
        dims: [7.9, 5.1, 2.2],
        weight_kg: 0.9,
        popularity: 74,
    },
    GearSeed {
        id: "gear-big-muff",
        name: "Big Muff Fuzz Pedal",
        category: "effects pedal",
        gear_type: "stompbox",
        dims: [5.5, 4.7, 2.5],
        weight_kg: 0.6,
        popularity: 81,
    },
    GearSeed {
        id: "gear-sm7b",
        name: "SM7B Microphone",
        category: "microphone",
        gear_type: "dynamic",
        dims: [7.5, 3.8, 3.8],
        weight_kg: 0.77,
        popularity: 90,
    },
    GearSeed {
        id: "gear-model-d",
        name: "Model D Reissue",
        category: "synthesizer",
        gear_type: "analog vintage",
        dims: [28.6, 17.0, 5.8],
        weight_kg: 14.9,
        popularity: 67,
    },
];

const CASE_SEEDS: &[CaseSeed] = &[
    CaseSeed {
        id: "case-keys-61-tour",
        name: "61-Key Tour Case",
        brand: "RoadReady",
        internal: [42.0, 16.5, 6.5],
        external: Some([45.0, 19.0, 8.5]),
        weight_kg: 8.2,
        price: 260,
        rating: Some(4.7),
        review_count: 112,
        protection: ProtectionLevel::High,
        flags: [true, true, true, true, true],
        material: "plywood with aluminum trim",
        color: "black",
        description: "hardshell keyboard flight case with dense foam interior and recessed latches",
        features: &["foam interior", "recessed latches", "wheels", "TSA lock"],
    },
    CaseSeed {
        id: "case-keys-61-gig",
        name: "61-Key Gig Bag",
        brand: "Nimbus",
        internal: [42.5, 17.0, 6.0],
        external: None,
        weight_kg: 2.4,
        price: 89,
        rating: Some(4.3),
        review_count: 203,
        protection: ProtectionLevel::Medium,
        flags: [false, false, true, false, false],
        material: "ballistic nylon",
        color: "charcoal",
        description: "padded keyboard case with accessory pocket and backpack straps",
        features: &["padded interior", "accessory pocket", "shoulder straps"],
    },
    CaseSeed {
        id: "case-keys-49-hard",
        name: "49-Key Hard Case",
        brand: "RoadReady",
        internal: [34.0, 18.0, 6.5],
        external: Some([36.5, 20.0, 8.0]),
        weight_kg: 6.8,
        price: 195,
        rating: Some(4.5),
        review_count: 64,
        protection: ProtectionLevel::High,
        flags: [true, true, true, false, true],
        material: "molded polyethylene",
        color: "black",
        description: "hardshell case with customizable foam compartments",
        features: &["foam interior", "compartment dividers", "padlock rings"],
    },
    CaseSeed {
        id: "case-utility-12",
        name: "Utility Hard Case 12",
        brand: "Pelagic",
        internal: [11.0, 8.0, 4.0],
        external: Some([12.5, 9.5, 5.2]),
        weight_kg: 1.4,
        price: 54,
        rating: Some(4.8),
        review_count: 340,
        protection: ProtectionLevel::High,
        flags: [true, true, true, false, true],
        material: "abs",
        color: "olive",
        description: "waterproof equipment case with pick-and-pluck foam",
        features: &["foam interior", "pressure valve", "waterproof seal"],
    },
    CaseSeed {
        id: "case-utility-8",
        name: "Utility Hard Case 8",
        brand: "Pelagic",
        internal: [8.5, 6.5, 3.5],
        external: Some([9.8, 7.8, 4.5]),
        weight_kg: 0.9,
        price: 38,
        rating: Some(4.6),
        review_count: 280,
        protection: ProtectionLevel::High,
        flags: [true, true, true, false, false],
        material: "abs",
        color: "black",
        description: "compact waterproof case with foam insert for small digital gear",
        features: &["foam interior", "waterproof seal"],
    },
    CaseSeed {
        id: "case-pedal-soft",
        name: "Pedal Pouch",
        brand: "Nimbus",
        internal: [6.5, 5.5, 3.0],
        external: None,
        weight_kg: 0.2,
        price: 19,
        rating: Some(4.1),
        review_count: 95,
        protection: ProtectionLevel::Low,
        flags: [false, false, false, false, false],
        material: "neoprene",
        color: "grey",
        description: "lightweight padded pouch for a single effects pedal",
        features: &["padded interior", "zip pocket"],
    },
    CaseSeed {
        id: "case-mic-vault",
        name: "Microphone Vault Case",
        brand: "Pelagic",
        internal: [9.0, 5.0, 4.5],
        external: Some([10.5, 6.5, 5.5]),
        weight_kg: 1.1,
        price: 72,
        rating: Some(4.9),
        review_count: 158,
        protection: ProtectionLevel::High,
        flags: [true, true, true, false, true],
        material: "abs",
        color: "black",
        description: "hardshell microphone case with plush foam cradle",
        features: &["foam cradle", "waterproof seal", "TSA lock"],
    },
    CaseSeed {
        id: "case-interface-shell",
        name: "Interface Shell Case",
        brand: "FormFit",
        internal: [9.0, 6.2, 3.0],
        external: None,
        weight_kg: 0.5,
        price: 42,
        rating: Some(4.2),
        review_count: 77,
        protection: ProtectionLevel::Medium,
        flags: [false, true, true, false, false],
        material: "eva foam shell",
        color: "black",
        description: "semi-rigid audio interface case with cable compartment",
        features: &["padded interior", "cable compartment"],
    },
    CaseSeed {
        id: "case-rack-rolling",
        name: "Rolling Rack Case",
        brand: "RoadReady",
        internal: [31.0, 19.5, 7.5],
        external: Some([34.0, 22.0, 10.0]),
        weight_kg: 11.3,
        price: 329,
        rating: Some(4.4),
        review_count: 41,
        protection: ProtectionLevel::High,
        flags: [false, true, true, true, true],
        material: "plywood with steel corners",
        color: "black",
        description: "hardshell rack case with wheels and butterfly latches",
        features: &["foam interior", "wheels", "butterfly latches"],
    },
    CaseSeed {
        id: "case-sampler-sleeve",
        name: "Sampler Sleeve",
        brand: "Nimbus",
        internal: [8.0, 6.8, 3.2],
        external: None,
        weight_kg: 0.3,
        price: 27,
        rating: None,
        review_count: 0,
        protection: ProtectionLevel::Low,
        flags: [false, false, false, false, false],
        material: "neoprene",
        color: "navy",
        description: "slim padded sleeve for grooveboxes and samplers",
        features: &["padded interior"],
    },
];

fn build_gear(seed: &GearSeed) -> Gear {
    Gear {
        id: GearId::new(seed.id),
        name: seed.name.to_owned(),
        category: seed.category.to_owned(),
        gear_type: seed.gear_type.to_owned(),
        dimensions: Dimensions::new(seed.dims[0], seed.dims[1], seed.dims[2], DimensionUnit::In),
        weight: Weight::new(seed.weight_kg, WeightUnit::Kg),
        popularity: seed.popularity,
    }
}

fn build_case(seed: &CaseSeed) -> Case {
    let [waterproof, shockproof, has_handle, has_wheels, has_lock] = seed.flags;
    Case {
        id: CaseId::new(seed.id),
        name: seed.name.to_owned(),
        brand: seed.brand.to_owned(),
        internal: Dimensions::new(
            seed.internal[0],
            seed.internal[1],
            seed.internal[2],
            DimensionUnit::In,
        ),
        external: seed
            .external
            .map(|[l, w, h]| Dimensions::new(l, w, h, DimensionUnit::In)),
        weight: Weight::new(seed.weight_kg, WeightUnit::Kg),
        price: Decimal::from(seed.price),
        currency: "USD".to_owned(),
        rating: seed.rating,
        review_count: seed.review_count,
        protection: seed.protection,
        waterproof,
        shockproof,
        has_handle,
        has_wheels,
        has_lock,
        material: seed.material.to_owned(),
        color: seed.color.to_owned(),
        description: seed.description.to_owned(),
        features: seed.features.iter().map(|f| (*f).to_owned()).collect(),
    }
}

pub struct DemoCatalog;

impl DemoCatalog {
    /// Upsert the demo gear and case catalog. Safe to run repeatedly.
    pub async fn load(pool: &DbPool) -> Result<SeedSummary, RepositoryError> {
        let gear_repo = SqlGearRepository::new(pool.clone());
        let case_repo = SqlCaseRepository::new(pool.clone());

        for seed in GEAR_SEEDS {
            gear_repo.save(build_gear(seed)).await?;
        }
        for seed in CASE_SEEDS {
            case_repo.save(build_case(seed)).await?;
        }

        Ok(SeedSummary { gear_seeded: GEAR_SEEDS.len(), cases_seeded: CASE_SEEDS.len() })
    }

    /// Confirm every seed row landed.
    pub async fn verify(pool: &DbPool) -> Result<bool, RepositoryError> {
        let gear_repo = SqlGearRepository::new(pool.clone());
        let case_repo = SqlCaseRepository::new(pool.clone());

        let gear_count = gear_repo.count().await?;
        let case_count =
            case_repo.count(&casefit_core::repository::CaseFilter::default()).await?;

        Ok(gear_count >= GEAR_SEEDS.len() as u64 && case_count >= CASE_SEEDS.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn seed_load_and_verify() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let summary = DemoCatalog::load(&pool).await.expect("load");
        assert_eq!(summary.gear_seeded, GEAR_SEEDS.len());
        assert_eq!(summary.cases_seeded, CASE_SEEDS.len());
        assert!(DemoCatalog::verify(&pool).await.expect("verify"));
    }

    #[tokio::test]
    async fn seed_is_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        DemoCatalog::load(&pool).await.expect("first load");
        let summary = DemoCatalog::load(&pool).await.expect("second load");

        let gear_repo = SqlGearRepository::new(pool.clone());
        assert_eq!(gear_repo.count().await.expect("count"), summary.gear_seeded as u64);
    }
}
