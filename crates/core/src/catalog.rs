//! Static door-product catalog.
//!
//! Pure key-value lookups over an in-memory catalog of entry-door series,
//! storm doors, patio doors, glass, hardware, and finish options. The sales
//! agent exposes these as tools; nothing in here performs I/O or holds
//! mutable state.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// One entry-door product line.
#[derive(Debug, Clone, Copy)]
pub struct DoorSeries {
    pub id: &'static str,
    pub name: &'static str,
    pub tier: &'static str,
    pub material: &'static str,
    pub description: &'static str,
    pub energy_star: bool,
    pub warranty: &'static str,
}

/// One storm-door product line.
#[derive(Debug, Clone, Copy)]
pub struct StormDoor {
    pub id: &'static str,
    pub name: &'static str,
    pub tier: &'static str,
    pub description: &'static str,
}

/// One patio-door product line.
#[derive(Debug, Clone, Copy)]
pub struct PatioDoor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub configurations: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct GlassOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct HardwareOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct FinishOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

const ENTRY_DOORS: &[DoorSeries] = &[
    DoorSeries {
        id: "embarq",
        name: "Embarq",
        tier: "Premium",
        material: "Fiberglass",
        description: "Premium 2.5\" thick fiberglass entry door with the Quad \
                      Glass System, the most energy-efficient door in the line.",
        energy_star: true,
        warranty: "Lifetime limited",
    },
    DoorSeries {
        id: "signet",
        name: "Signet",
        tier: "Premium",
        material: "Fiberglass",
        description: "Premium fiberglass door with dovetailed stile-and-rail \
                      construction and the widest range of customization.",
        energy_star: true,
        warranty: "Lifetime limited",
    },
    DoorSeries {
        id: "heritage",
        name: "Heritage",
        tier: "Mid-range",
        material: "Fiberglass",
        description: "Mid-range fiberglass door with enhanced woodgrain texture \
                      and a broad selection of styles.",
        energy_star: true,
        warranty: "Limited lifetime",
    },
    DoorSeries {
        id: "legacy",
        name: "Legacy",
        tier: "Value",
        material: "Steel",
        description: "Value 20-gauge steel door with 49% more steel than a \
                      standard residential door.",
        energy_star: true,
        warranty: "10-year limited",
    },
];

const STORM_DOORS: &[StormDoor] = &[
    StormDoor {
        id: "spectrum",
        name: "Spectrum",
        tier: "Premium",
        description: "Fully customizable aluminum storm door with retractable \
                      Inspirations screen and decorative glass choices.",
    },
    StormDoor {
        id: "deluxe",
        name: "Deluxe",
        tier: "Heavy-duty",
        description: "1.5\" thick aluminum storm door with reinforced corner \
                      gussets, built for high-traffic entries.",
    },
    StormDoor {
        id: "superview",
        name: "Superview",
        tier: "Mid-range",
        description: "Storm door with an oversized glass area for maximum \
                      natural light and curb visibility.",
    },
    StormDoor {
        id: "decorator",
        name: "Decorator",
        tier: "Value",
        description: "Value aluminum storm door in the most popular styles \
                      and colors.",
    },
];

const PATIO_DOORS: &[PatioDoor] = &[
    PatioDoor {
        id: "endure_vinyl_sliding",
        name: "Endure Vinyl Sliding",
        description: "Premium vinyl sliding patio door with ComforTech \
                      glazing, all models Energy Star certified.",
        configurations: &["2-panel", "3-panel", "4-panel"],
    },
    PatioDoor {
        id: "aspect_vinyl_sliding",
        name: "Aspect Vinyl Sliding",
        description: "Mid-range vinyl sliding patio door balancing energy \
                      performance and price.",
        configurations: &["2-panel", "3-panel"],
    },
    PatioDoor {
        id: "legacy_steel_sliding",
        name: "Legacy Steel Sliding",
        description: "20-gauge steel sliding patio door matched to the Legacy \
                      entry series.",
        configurations: &["2-panel"],
    },
    PatioDoor {
        id: "heritage_hinged",
        name: "Heritage Fiberglass Hinged",
        description: "Hinged fiberglass patio door in single and french \
                      configurations with full sidelite options.",
        configurations: &["single", "french", "single with sidelites"],
    },
];

const GLASS_OPTIONS: &[GlassOption] = &[
    GlassOption {
        id: "comfortech_glazing",
        name: "ComforTech Warm Edge Glazing",
        description: "Insulated glazing packages with warm-edge spacers for \
                      superior thermal performance.",
    },
    GlassOption {
        id: "decorative_glass",
        name: "Decorative Glass",
        description: "Patterned art-glass inserts with caming finishes and \
                      privacy ratings from 1 to 10.",
    },
    GlassOption {
        id: "privacy_glass",
        name: "Privacy Glass",
        description: "Textured obscure glass available in multiple patterns \
                      for light without visibility.",
    },
    GlassOption {
        id: "internal_blinds",
        name: "Internal Blinds",
        description: "Blinds sealed between glass panes, raised and tilted \
                      without dusting.",
    },
];

const HARDWARE_OPTIONS: &[HardwareOption] = &[
    HardwareOption {
        id: "trilennium_multipoint",
        name: "Trilennium Multi-Point Lock",
        description: "Three-point locking system engaging the frame at top, \
                      center, and bottom for security and a tighter seal.",
    },
    HardwareOption {
        id: "emtek_mortise",
        name: "Emtek Mortise Lock",
        description: "Traditional mortise lockset in a range of period styles \
                      and finishes.",
    },
    HardwareOption {
        id: "schlage_electronic",
        name: "Schlage Electronic Lock",
        description: "Keypad deadbolt with user codes, compatible with most \
                      entry door series.",
    },
];

const FINISH_OPTIONS: &[FinishOption] = &[
    FinishOption {
        id: "stain",
        name: "Stain Finish",
        description: "Hand-applied multi-step stain over woodgrain skins, in \
                      eight standard colors.",
    },
    FinishOption {
        id: "paint",
        name: "Paint Finish",
        description: "Factory-applied paint in standard and custom colors, \
                      including dual interior/exterior finishes.",
    },
    FinishOption {
        id: "durafuse",
        name: "DuraFuse Finishing System",
        description: "Fused paint finish for premium fiberglass doors with an \
                      extended finish warranty.",
    },
];

/// Returns every entry-door series, premium tier first.
pub fn entry_door_series() -> &'static [DoorSeries] {
    ENTRY_DOORS
}

/// Looks up a door series by its id (case-insensitive).
pub fn entry_door(series_id: &str) -> Option<&'static DoorSeries> {
    let id = series_id.to_lowercase();
    ENTRY_DOORS.iter().find(|d| d.id == id)
}

pub fn storm_doors() -> &'static [StormDoor] {
    STORM_DOORS
}

pub fn patio_doors() -> &'static [PatioDoor] {
    PATIO_DOORS
}

pub fn glass_options() -> &'static [GlassOption] {
    GLASS_OPTIONS
}

pub fn hardware_options() -> &'static [HardwareOption] {
    HARDWARE_OPTIONS
}

pub fn finish_options() -> &'static [FinishOption] {
    FINISH_OPTIONS
}

/// A single fuzzy-search hit across the whole catalog.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub kind: &'static str,
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub score: i64,
}

/// Fuzzy keyword search over every catalog section, best matches first.
pub fn search_products(query: &str) -> Vec<SearchHit> {
    let matcher = SkimMatcherV2::default();
    let mut hits: Vec<SearchHit> = Vec::new();

    let mut consider = |kind: &'static str,
                        id: &'static str,
                        name: &'static str,
                        description: &'static str| {
        let haystack = format!("{name} {description}");
        if let Some(score) = matcher.fuzzy_match(&haystack, query) {
            hits.push(SearchHit {
                kind,
                id,
                name,
                description,
                score,
            });
        }
    };

    for d in ENTRY_DOORS {
        consider("entry_door", d.id, d.name, d.description);
    }
    for s in STORM_DOORS {
        consider("storm_door", s.id, s.name, s.description);
    }
    for p in PATIO_DOORS {
        consider("patio_door", p.id, p.name, p.description);
    }
    for g in GLASS_OPTIONS {
        consider("glass", g.id, g.name, g.description);
    }
    for h in HARDWARE_OPTIONS {
        consider("hardware", h.id, h.name, h.description);
    }
    for f in FINISH_OPTIONS {
        consider("finish", f.id, f.name, f.description);
    }

    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits
}

/// Formats a door series as a markdown summary for the agent.
pub fn format_door_summary(door: &DoorSeries) -> String {
    format!(
        "**{}** ({} / {})\n{}\nEnergy Star: {}\nWarranty: {}",
        door.name,
        door.tier,
        door.material,
        door.description,
        if door.energy_star { "Yes" } else { "No" },
        door.warranty,
    )
}
