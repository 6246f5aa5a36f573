// Controlled Vocabularies - closed enums validated at the input boundary
//
// These mirror the codes the general-ledger system actually accepts. The
// codes themselves are hard to change, but their meanings drift over time;
// keeping the name -> code mapping in one place means a market can be renamed
// without touching the code written to the import files.

use serde::{Deserialize, Serialize};

/// Fixed G/L account that clears intercompany balances on the asset side
/// (due from related entity).
pub const INTERCOMPANY_GL_ASSET_ACCOUNT: &str = "12300";

/// Fixed G/L account that clears intercompany balances on the liability side
/// (due to related entity).
pub const INTERCOMPANY_GL_LIABILITY_ACCOUNT: &str = "22300";

// ============================================================================
// ACCOUNT TYPE
// ============================================================================

/// Which ledger or sub-ledger a journal line posts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// Posts to the general ledger
    GeneralLedger,
    /// Posts to the accounts-receivable customer sub-ledger
    Customer,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::GeneralLedger => "G/L Account",
            AccountType::Customer => "Customer",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DOCUMENT TYPE
// ============================================================================

/// The document classification carried by a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Invoice,
    CreditMemo,
    Payment,
    JournalEntry,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "Invoice",
            DocumentType::CreditMemo => "Credit Memo",
            DocumentType::Payment => "Payment",
            DocumentType::JournalEntry => "Journal Entry",
            DocumentType::Other => "Other",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "invoice" => Ok(DocumentType::Invoice),
            "credit memo" => Ok(DocumentType::CreditMemo),
            "payment" => Ok(DocumentType::Payment),
            "journal entry" => Ok(DocumentType::JournalEntry),
            "other" => Ok(DocumentType::Other),
            _ => Err(format!("unknown document type: {s}")),
        }
    }
}

// ============================================================================
// DEPARTMENT
// ============================================================================

/// Department dimension values accepted by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    Corporate,
    Retail,
    Sales,
    Marketing,
    Operations,
    Finance,
    HumanResources,
    InformationTechnology,
    Other,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Corporate => "Corporate",
            Department::Retail => "Retail",
            Department::Sales => "Sales",
            Department::Marketing => "Marketing",
            Department::Operations => "Operations",
            Department::Finance => "Finance",
            Department::HumanResources => "Human Resources",
            Department::InformationTechnology => "Information Technology",
            Department::Other => "Other",
        }
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "corporate" => Ok(Department::Corporate),
            "retail" => Ok(Department::Retail),
            "sales" => Ok(Department::Sales),
            "marketing" => Ok(Department::Marketing),
            "operations" => Ok(Department::Operations),
            "finance" => Ok(Department::Finance),
            "human resources" => Ok(Department::HumanResources),
            "information technology" => Ok(Department::InformationTechnology),
            "other" => Ok(Department::Other),
            _ => Err(format!("unknown department: {s}")),
        }
    }
}

// ============================================================================
// DIVISION
// ============================================================================

/// Division dimension, a single digit 1-6 in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Division {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
}

impl Division {
    pub fn as_str(&self) -> &'static str {
        match self {
            Division::One => "1",
            Division::Two => "2",
            Division::Three => "3",
            Division::Four => "4",
            Division::Five => "5",
            Division::Six => "6",
        }
    }
}

impl std::fmt::Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Division {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Division::One),
            "2" => Ok(Division::Two),
            "3" => Ok(Division::Three),
            "4" => Ok(Division::Four),
            "5" => Ok(Division::Five),
            "6" => Ok(Division::Six),
            _ => Err(format!("unknown division: {s}")),
        }
    }
}

// ============================================================================
// MARKET
// ============================================================================

/// Market dimension codes. The variant is the human name, `as_str()` is the
/// code the ledger stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Market {
    Albuquerque,
    Atlanta,
    Baltimore,
    Billings,
    Boise,
    Boston,
    Birmingham,
    Charlotte,
    Chicago,
    Cincinnati,
    Cleveland,
    Corporate,
    Dakota,
    Dallas,
    Denver,
    DesMoines,
    GrandRapids,
    Honolulu,
    Houston,
    Indiana,
    Jackson,
    NorthFlorida,
    Kansas,
    Knoxville,
    LasVegas,
    LittleRock,
    Louisville,
    Memphis,
    Miami,
    Milwaukee,
    Minnesota,
    Nashville,
    NewOrleans,
    NorthCalifornia,
    NyMetro,
    NyUpstate,
    Oklahoma,
    Omaha,
    Orlando,
    Philadelphia,
    Phoenix,
    Pittsburgh,
    Portland,
    Richmond,
    SaltLake,
    SanAntonio,
    Seattle,
    SouthCalifornia,
    SouthCarolina,
    Spokane,
    StLouis,
    Tampa,
    WestTexas,
}

impl Market {
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Albuquerque => "ALBUQ",
            Market::Atlanta => "ATLANTA",
            Market::Baltimore => "BALTI",
            Market::Billings => "BILLI",
            Market::Boise => "BOISE",
            Market::Boston => "BOSTON",
            Market::Birmingham => "BIRMING",
            Market::Charlotte => "CHARL",
            Market::Chicago => "CHICA",
            Market::Cincinnati => "CINCI",
            Market::Cleveland => "CLEVE",
            Market::Corporate => "CORPO",
            Market::Dakota => "DAKOT",
            Market::Dallas => "DALLA",
            Market::Denver => "DENVE",
            Market::DesMoines => "DESMO",
            Market::GrandRapids => "GRAND",
            Market::Honolulu => "HONOL",
            Market::Houston => "HOUST",
            Market::Indiana => "INDIA",
            Market::Jackson => "JACKS",
            Market::NorthFlorida => "JAXSV",
            Market::Kansas => "KANSA",
            Market::Knoxville => "KNOXV",
            Market::LasVegas => "LASVE",
            Market::LittleRock => "LITTL",
            Market::Louisville => "LOUIS",
            Market::Memphis => "MEMPH",
            Market::Miami => "MIAMI",
            Market::Milwaukee => "MILWA",
            Market::Minnesota => "MINNE",
            Market::Nashville => "NASHV",
            Market::NewOrleans => "NEWOR",
            Market::NorthCalifornia => "NOCAL",
            Market::NyMetro => "NYMET",
            Market::NyUpstate => "NYUPST",
            Market::Oklahoma => "OKLAH",
            Market::Omaha => "OMAHA",
            Market::Orlando => "ORLANDO",
            Market::Philadelphia => "PHILA",
            Market::Phoenix => "PHOEN",
            Market::Pittsburgh => "PITTS",
            Market::Portland => "PORTL",
            Market::Richmond => "RICHM",
            Market::SaltLake => "SALTL",
            Market::SanAntonio => "SANAN",
            Market::Seattle => "SEATT",
            Market::SouthCalifornia => "SOCAL",
            Market::SouthCarolina => "SOCAR",
            Market::Spokane => "SPOKA",
            Market::StLouis => "STLOU",
            Market::Tampa => "TAMPA",
            Market::WestTexas => "WESTT",
        }
    }

    /// All markets, for validation listings.
    pub fn all() -> &'static [Market] {
        use Market::*;
        &[
            Albuquerque,
            Atlanta,
            Baltimore,
            Billings,
            Boise,
            Boston,
            Birmingham,
            Charlotte,
            Chicago,
            Cincinnati,
            Cleveland,
            Corporate,
            Dakota,
            Dallas,
            Denver,
            DesMoines,
            GrandRapids,
            Honolulu,
            Houston,
            Indiana,
            Jackson,
            NorthFlorida,
            Kansas,
            Knoxville,
            LasVegas,
            LittleRock,
            Louisville,
            Memphis,
            Miami,
            Milwaukee,
            Minnesota,
            Nashville,
            NewOrleans,
            NorthCalifornia,
            NyMetro,
            NyUpstate,
            Oklahoma,
            Omaha,
            Orlando,
            Philadelphia,
            Phoenix,
            Pittsburgh,
            Portland,
            Richmond,
            SaltLake,
            SanAntonio,
            Seattle,
            SouthCalifornia,
            SouthCarolina,
            Spokane,
            StLouis,
            Tampa,
            WestTexas,
        ]
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Market::all()
            .iter()
            .find(|m| m.as_str() == code)
            .copied()
            .ok_or_else(|| format!("unknown market: {s}"))
    }
}

// ============================================================================
// TESTS
// ============================================================================
