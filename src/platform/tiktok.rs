//! TikTok export support.
//!
//! The TikTok "TXT" export is a zip of plain text files, one per data kind,
//! each a sequence of `Label: value` records separated by blank lines.
use super::{Platform, PlatformCopy};
use crate::archive::MemberSource;
use crate::extract::{extract_all, Extraction, Extractor, FieldSpec, TableSpec, TemplateSpec};
use crate::props::StaticText;
use crate::validate::{DdpCategory, DdpFileType, Language, StatusCode, StatusCodes, Validator};
use anyhow::Result;
use serde_json::json;

pub const PLATFORM_ID: &str = "tiktok";
pub const PLATFORM_NAME: &str = "TikTok";

pub const DDP_CATEGORIES: &[DdpCategory] = &[DdpCategory {
    id: "json_en",
    file_type: DdpFileType::Json,
    language: Language::En,
    known_files: &[
        "Transaction History.txt",
        "Most Recent Location Data.txt",
        "Comments.txt",
        "Purchases.txt",
        "Share History.txt",
        "Favorite Sounds.txt",
        "Searches.txt",
        "Login History.txt",
        "Favorite Videos.txt",
        "Favorite HashTags.txt",
        "Hashtag.txt",
        "Location Reviews.txt",
        "Favorite Effects.txt",
        "Following.txt",
        "Status.txt",
        "Browsing History.txt",
        "Like List.txt",
        "Follower.txt",
        "Watch Live settings.txt",
        "Go Live settings.txt",
        "Go Live History.txt",
        "Watch Live History.txt",
        "Profile Info.txt",
        "Autofill.txt",
        "Post.txt",
        "Block List.txt",
        "Settings.txt",
        "Customer support history.txt",
        "Communication with shops.txt",
        "Current Payment Information.txt",
        "Returns and Refunds History.txt",
        "Product Reviews.txt",
        "Order History.txt",
        "Vouchers.txt",
        "Saved Address Information.txt",
        "Order dispute history.txt",
        "Product Browsing History.txt",
        "Shopping Cart List.txt",
        "Direct Messages.txt",
        "Off TikTok Activity.txt",
        "Ad Interests.txt",
    ],
}];

pub const STATUS_CODES: StatusCodes = StatusCodes {
    valid: StatusCode {
        id: 0,
        description: "Valid DDP",
        message: "",
    },
    unrecognized: StatusCode {
        id: 1,
        description: "Not a valid DDP",
        message: "",
    },
    unreadable: StatusCode {
        id: 2,
        description: "Bad zip",
        message: "",
    },
};

const DATE: FieldSpec = FieldSpec::new("Date:", "moment");

fn watched_per_month() -> Vec<serde_json::Value> {
    vec![json!({
        "title": {
            "en": "Totaal aantal videos gekeken per maand",
            "nl": "Totaal aantal videos gekeken per maand"
        },
        "type": "area",
        "group": {"column": "moment", "dateFormat": "month"},
        "values": [{"label": "Aantal"}]
    })]
}

fn search_wordcloud() -> Vec<serde_json::Value> {
    vec![json!({
        "title": {"en": "", "nl": ""},
        "type": "wordcloud",
        "textColumn": "term"
    })]
}

pub static TABLES: &[TableSpec] = &[
    TableSpec::new(
        "tiktok_video_browsing_history",
        "Browsing History.txt",
        StaticText::same("Kijkgeschiedenis"),
        StaticText::same(
            "De tabel hieronder geeft aan welke TikTok video's je precies hebt bekeken en wanneer dat was. De grafiek laat zien hoeveel video's je elke maand hebt bekeken.",
        ),
        TemplateSpec::Records(&[DATE, FieldSpec::new("Link:", "video")]),
    )
    .with_visualizations(watched_per_month),
    TableSpec::new(
        "tiktok_favorite_videos",
        "Favorite Videos.txt",
        StaticText::same("Favoriete video's"),
        StaticText::same("In de tabel hieronder vind je de videos die tot je favorieten behoren."),
        TemplateSpec::Records(&[DATE, FieldSpec::new("Link:", "video")]),
    ),
    TableSpec::new(
        "tiktok_favorite_hashtags",
        "Favorite HashTags.txt",
        StaticText::same("Favoriete hashtags"),
        StaticText::same("In de tabel hieronder vind je de hashtags die tot je favorieten behoren."),
        TemplateSpec::Records(&[DATE, FieldSpec::new("HashTag Link::?", "hashtag_url")]),
    ),
    TableSpec::new(
        "tiktok_hashtag",
        "Hashtag.txt",
        StaticText::same("Hashtags in video's die je hebt geplaatst"),
        StaticText::same(
            "In de tabel hieronder vind je de hashtags die je gebruikt hebt in een video die je hebt geplaats op TikTok.",
        ),
        TemplateSpec::Records(&[
            FieldSpec::new("Hashtag Name:", "hashtag_name"),
            FieldSpec::new("Hashtag Link:", "hashtag_url"),
        ]),
    ),
    TableSpec::new(
        "tiktok_like_list",
        "Like List.txt",
        StaticText::same("Videos die je hebt geliket"),
        StaticText::same(
            "In de tabel hieronder vind je de videos die je hebt geliket en wanneer dat was.",
        ),
        TemplateSpec::Records(&[DATE, FieldSpec::new("Link:", "video")]),
    ),
    TableSpec::new(
        "tiktok_searches",
        "Searches.txt",
        StaticText::same("Zoektermen"),
        StaticText::same(
            "De tabel hieronder laat zien wat je hebt gezocht en wanneer dat was. De grootte van de woorden in de grafiek geven aan hoevaak de zoekterm voorkomt in jouw gegevens.",
        ),
        TemplateSpec::Records(&[DATE, FieldSpec::new("Search Term:", "term")]),
    )
    .with_visualizations(search_wordcloud),
    TableSpec::new(
        "tiktok_share_history",
        "Share History.txt",
        StaticText::same("Gedeelde video's"),
        StaticText::same(
            "In de table hieronder vind je wat je hebt gedeeld op welk tijdstip en de manier waarop.",
        ),
        TemplateSpec::Records(&[
            DATE,
            FieldSpec::new("Shared Content:", "shared_content").continued(),
            FieldSpec::new("Link:", "url"),
            FieldSpec::new("Method:", "method"),
        ]),
    ),
    TableSpec::new(
        "tiktok_settings",
        "Settings.txt",
        StaticText::same("Interesses op TikTok"),
        StaticText::same(
            "Hieronder vind je de interesses die je hebt aangevinkt bij het aanmaken van je TikTok account",
        ),
        TemplateSpec::List {
            label: "Interests:",
            column: "interest",
            separator: '|',
        },
    ),
];

pub static COPY: PlatformCopy = PlatformCopy {
    file_page_title: StaticText::same("Selecteer je TikTok bestand"),
    file_prompt: StaticText::same(
        "Volg de download instructies en kies het bestand dat je opgeslagen hebt op jouw apparaat.",
    ),
    retry_text: StaticText {
        en: "Unfortunately, we could not process your TikTok file. If you are sure that you selected the correct file, press Continue. To select a different file, press Try again.",
        nl: "Helaas, kunnen we uw TikTok bestand niet verwerken. Weet u zeker dat u het juiste bestand heeft gekozen? Ga dan verder. Probeer opnieuw als u een ander bestand wilt kiezen.",
    },
    consent_page_title: StaticText::same("Jouw TikTok gegevens delen"),
    consent_description: StaticText::same(
        "Hieronder zie je jouw gegevens over je eigen TikTok-gebruik. Bekijk de gegevens zorgvuldig, en verwijder de gegevens die je niet wil delen. Als je deze gegevens wil delen, klik dan op de knop \u{2018}Ja, deel voor onderzoek\u{2019} onderaan deze pagina. Door deze gegevens te delen draag je bij aan onderzoek over hoe jongeren TikTok gebruiken, alvast heel erg bedankt!",
    ),
    donate_question: StaticText::same("Wil je deze gegevens delen voor onderzoek?"),
    donate_button: StaticText::same("Ja, deel voor onderzoek"),
};

pub struct TikTok {
    validator: Validator,
    extractors: Vec<Extractor>,
}

impl TikTok {
    pub fn new() -> Result<Self> {
        let extractors = TABLES.iter().map(Extractor::new).collect::<Result<Vec<_>>>()?;
        Ok(Self {
            validator: Validator::new(DDP_CATEGORIES, STATUS_CODES),
            extractors,
        })
    }
}

impl Platform for TikTok {
    fn id(&self) -> &'static str {
        PLATFORM_ID
    }

    fn name(&self) -> &'static str {
        PLATFORM_NAME
    }

    fn validator(&self) -> &Validator {
        &self.validator
    }

    fn copy(&self) -> &PlatformCopy {
        &COPY
    }

    fn extract(&self, archive: &dyn MemberSource) -> Extraction {
        extract_all(&self.extractors, archive)
    }
}

#[cfg(test)]
#[path = "tiktok_tests.rs"]
mod tests;
