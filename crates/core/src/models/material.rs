//! Static material catalog.
//!
//! Every material the game is known to produce is listed here and split into
//! three categories. Identifiers that are not in the catalog are kept out of
//! these enums entirely and tracked as [`UnknownMaterial`]s instead.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

identifier_enum! {
    /// Items: physical goods carried on foot.
    Good {
        AgriculturalProcessSample => "agriculturalprocesssample",
        BiochemicalAgent => "biochemicalagent",
        BuildingSchematic => "buildingschematic",
        Californium => "californium",
        CastFossil => "castfossil",
        ChemicalProcessSample => "chemicalprocesssample",
        ChemicalSample => "chemicalsample",
        CompactLibrary => "compactlibrary",
        CompressionLiquefiedGas => "compressionliquefiedgas",
        DeepMantleSample => "deepmantlesample",
        DegradedPowerRegulator => "degradedpowerregulator",
        GeneticRepairMeds => "geneticrepairmeds",
        GeneticSample => "geneticsample",
        GMeds => "gmeds",
        HealthMonitor => "healthmonitor",
        Hush => "hush",
        InertiaCanister => "inertiacanister",
        Infinity => "infinity",
        InorganicContaminant => "inorganiccontaminant",
        Insight => "insight",
        InsightDataBank => "insightdatabank",
        InsightEntertainmentSuite => "insightentertainmentsuite",
        IonisedGas => "ionisedgas",
        LargeCapacityPowerRegulator => "largecapacitypowerregulator",
        Lazarus => "lazarus",
        MicrobialInhibitor => "microbialinhibitor",
        MutagenicCatalyst => "mutageniccatalyst",
        NutritionalConcentrate => "nutritionalconcentrate",
        PersonalComputer => "personalcomputer",
        PersonalDocuments => "personaldocuments",
        PetrifiedFossil => "petrifiedfossil",
        PowerRegulator => "powerregulator",
        Push => "push",
        PyrolyticCatalyst => "pyrolyticcatalyst",
        RefinementProcessSample => "refinementprocesssample",
        ShipSchematic => "shipschematic",
        SuitSchematic => "suitschematic",
        SurveillanceEquipment => "surveillanceequipment",
        SyntheticGenome => "syntheticgenome",
        SyntheticPathogen => "syntheticpathogen",
        TrueFormFossil => "trueformfossil",
        UniversalTranslator => "universaltranslator",
        VehicleSchematic => "vehicleschematic",
        WeaponSchematic => "weaponschematic",
    }
}

identifier_enum! {
    /// Components and consumables.
    Asset {
        Aerogel => "aerogel",
        CarbonFibrePlating => "carbonfibreplating",
        ChemicalCatalyst => "chemicalcatalyst",
        ChemicalSuperbase => "chemicalsuperbase",
        CircuitBoard => "circuitboard",
        CircuitSwitch => "circuitswitch",
        ElectricalFuse => "electricalfuse",
        ElectricalWiring => "electricalwiring",
        Electromagnet => "electromagnet",
        EncryptedMemoryChip => "encryptedmemorychip",
        Epinephrine => "epinephrine",
        EpoxyAdhesive => "epoxyadhesive",
        Graphene => "graphene",
        IonBattery => "ionbattery",
        MemoryChip => "memorychip",
        MetalCoil => "metalcoil",
        MicroElectrode => "microelectrode",
        MicroHydraulics => "microhydraulics",
        MicroSupercapacitor => "microsupercapacitor",
        MicroThrusters => "microthrusters",
        MicroTransformer => "microtransformer",
        Motor => "motor",
        OpticalFibre => "opticalfibre",
        OpticalLens => "opticallens",
        OxygenicBacteria => "oxygenicbacteria",
        PhNeutraliser => "phneutraliser",
        Rdx => "rdx",
        Scrambler => "scrambler",
        TitaniumPlating => "titaniumplating",
        Transmitter => "transmitter",
        TungstenCarbide => "tungstencarbide",
        ViscoelasticPolymer => "viscoelasticpolymer",
        WeaponComponent => "weaponcomponent",
        HealthPack => "healthpack",
        EnergyCell => "energycell",
        EmpGrenade => "amm_grenade_emp",
        FragGrenade => "amm_grenade_frag",
        ShieldDisruptor => "amm_grenade_shield",
        Bypass => "bypass",
    }
}

identifier_enum! {
    /// Data downloaded from terminals and ports.
    Data {
        AccidentLogs => "accidentlogs",
        AirQualityReports => "airqualityreports",
        AtmosphericData => "atmosphericdata",
        AudioLogs => "audiologs",
        AxCombatLogs => "axcombatlogs",
        BallisticsData => "ballisticsdata",
        BiologicalWeaponData => "biologicalweapondata",
        BiometricData => "biometricdata",
        BlacklistData => "blacklistdata",
        BloodTestResults => "bloodtestresults",
        CampaignPlans => "campaignplans",
        CatMedia => "catmedia",
        CensusData => "censusdata",
        ChemicalExperimentData => "chemicalexperimentdata",
        ChemicalFormulae => "chemicalformulae",
        ChemicalInventory => "chemicalinventory",
        ChemicalPatents => "chemicalpatents",
        ChemicalWeaponData => "chemicalweapondata",
        ClassicEntertainment => "classicentertainment",
        ClinicalTrialRecords => "clinicaltrialrecords",
        CombatTrainingMaterial => "combattrainingmaterial",
        CombatantPerformance => "combatantperformance",
        ConflictHistory => "conflicthistory",
        CriminalRecords => "criminalrecords",
        CropYieldAnalysis => "cropyieldanalysis",
        CulinaryRecipes => "culinaryrecipes",
        DigitalDesigns => "digitaldesigns",
        DutyRota => "dutyrota",
        EmployeeDirectory => "employeedirectory",
        EmployeeExpenses => "employeeexpenses",
        EmployeeGeneticData => "employeegeneticdata",
        EmploymentHistory => "employmenthistory",
        EnhancedInterrogationRecordings => "enhancedinterrogationrecordings",
        EspionageMaterial => "espionagematerial",
        EvacuationProtocols => "evacuationprotocols",
        ExplorationJournals => "explorationjournals",
        ExtractionYieldData => "extractionyielddata",
        FactionAssociates => "factionassociates",
        FactionDonatorList => "factiondonatorlist",
        FactionNews => "factionnews",
        FinancialProjections => "financialprojections",
        FleetRegistry => "fleetregistry",
        GeneSequencingData => "genesequencingdata",
        GeneticResearch => "geneticresearch",
        GeologicalData => "geologicaldata",
        HydroponicData => "hydroponicdata",
        IncidentLogs => "incidentlogs",
        InfluenceProjections => "influenceprojections",
        InternalCorrespondence => "internalcorrespondence",
        InterrogationRecordings => "interrogationrecordings",
        InterviewRecordings => "interviewrecordings",
        JobApplications => "jobapplications",
        Kompromat => "kompromat",
        LiteraryFiction => "literaryfiction",
        MaintenanceLogs => "maintenancelogs",
        ManufacturingInstructions => "manufacturinginstructions",
        MedicalRecords => "medicalrecords",
        MeetingMinutes => "meetingminutes",
        MineralSurvey => "mineralsurvey",
        MiningAnalytics => "mininganalytics",
        MultimediaEntertainment => "multimediaentertainment",
        NetworkAccessHistory => "networkaccesshistory",
        NetworkSecurityProtocols => "networksecurityprotocols",
        NextOfKinRecords => "nextofkinrecords",
        NocData => "nocdata",
        OperationalManual => "operationalmanual",
        OpinionPolls => "opinionpolls",
        PatrolRoutes => "patrolroutes",
        PayrollInformation => "payrollinformation",
        PersonalLogs => "personallogs",
        PharmaceuticalPatents => "pharmaceuticalpatents",
        PhotoAlbums => "photoalbums",
        PlantGrowthCharts => "plantgrowthcharts",
        PoliticalAffiliations => "politicalaffiliations",
        PrisonerLogs => "prisonerlogs",
        ProductionReports => "productionreports",
        ProductionSchedule => "productionschedule",
        Propaganda => "propaganda",
        PurchaseRecords => "purchaserecords",
        PurchaseRequests => "purchaserequests",
        RadioactivityData => "radioactivitydata",
        ReactorOutputReview => "reactoroutputreview",
        RecyclingLogs => "recyclinglogs",
        ResidentialDirectory => "residentialdirectory",
        RiskAssessments => "riskassessments",
        SalesRecords => "salesrecords",
        SecurityExpenses => "securityexpenses",
        SeedGeneaology => "seedgeneaology",
        SettlementAssaultPlans => "settlementassaultplans",
        SettlementDefencePlans => "settlementdefenceplans",
        ShareholderInformation => "shareholderinformation",
        SlushFundLogs => "slushfundlogs",
        SmearCampaignPlans => "smearcampaignplans",
        SpectralAnalysisData => "spectralanalysisdata",
        Spyware => "spyware",
        StockMarketData => "stockmarketdata",
        SurveilleanceLogs => "surveilleancelogs",
        TacticalPlans => "tacticalplans",
        TaxRecords => "taxrecords",
        TopographicalSurveys => "topographicalsurveys",
        TravelPermits => "travelpermits",
        TroopDeploymentRecords => "troopdeploymentrecords",
        UnionMembership => "unionmembership",
        VaccinationRecords => "vaccinationrecords",
        VaccineResearch => "vaccineresearch",
        VipSecurityDetail => "vipsecuritydetail",
        VirologyData => "virologydata",
        Virus => "virus",
        VisitorRegister => "visitorregister",
        WeaponInventory => "weaponinventory",
        WeaponTestData => "weapontestdata",
        XenoDefenceProtocols => "xenodefenceprotocols",
    }
}

/// Category a material is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StorageType {
    /// Items.
    Good,
    /// Components and consumables.
    Asset,
    /// Downloaded data.
    Data,
    /// Pseudo-category for records the game files under none of the above.
    Other,
}

impl StorageType {
    /// Map a journal `Type`/`Category` value onto a storage category.
    pub fn from_journal_category(category: &str) -> Self {
        match category.trim().to_ascii_lowercase().as_str() {
            "item" | "items" | "good" | "goods" => StorageType::Good,
            "component" | "components" | "consumable" | "consumables" | "asset" | "assets" => {
                StorageType::Asset
            }
            "data" => StorageType::Data,
            _ => StorageType::Other,
        }
    }
}

/// A catalogued material, tagged with its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Material {
    /// An item.
    Good(Good),
    /// A component or consumable.
    Asset(Asset),
    /// A data entry.
    Data(Data),
}

impl Material {
    /// Category this material is stored under.
    pub fn storage_type(self) -> StorageType {
        match self {
            Material::Good(_) => StorageType::Good,
            Material::Asset(_) => StorageType::Asset,
            Material::Data(_) => StorageType::Data,
        }
    }

    /// Identifier as written by the game.
    pub fn id(self) -> &'static str {
        match self {
            Material::Good(good) => good.id(),
            Material::Asset(asset) => asset.id(),
            Material::Data(data) => data.id(),
        }
    }

    /// Resolve an identifier within a single category.
    pub fn lookup(category: StorageType, id: &str) -> Option<Self> {
        match category {
            StorageType::Good => Good::from_id(id).map(Material::Good),
            StorageType::Asset => Asset::from_id(id).map(Material::Asset),
            StorageType::Data => Data::from_id(id).map(Material::Data),
            StorageType::Other => None,
        }
    }

    /// Resolve an identifier by trying every category in turn.
    pub fn from_any_id(id: &str) -> Option<Self> {
        [StorageType::Good, StorageType::Asset, StorageType::Data]
            .into_iter()
            .find_map(|category| Material::lookup(category, id))
    }

    /// Every catalogued material.
    pub fn all() -> impl Iterator<Item = Material> {
        Good::ALL
            .iter()
            .copied()
            .map(Material::Good)
            .chain(Asset::ALL.iter().copied().map(Material::Asset))
            .chain(Data::ALL.iter().copied().map(Material::Data))
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// An identifier seen in game data that the catalog does not know.
///
/// The identifier keeps the spelling it was first seen with. Comparisons
/// and hashing ignore ASCII case, matching catalog lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnknownMaterial {
    /// Category the record was filed under.
    pub category: StorageType,
    /// Raw identifier.
    pub id: String,
}

impl UnknownMaterial {
    /// Unknown material for a raw identifier; surrounding whitespace is dropped.
    pub fn new(category: StorageType, id: &str) -> Self {
        Self {
            category,
            id: id.trim().to_string(),
        }
    }

    fn folded(&self) -> impl Iterator<Item = u8> + '_ {
        self.id.bytes().map(|byte| byte.to_ascii_lowercase())
    }
}

impl PartialEq for UnknownMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category && self.id.eq_ignore_ascii_case(&other.id)
    }
}

impl Eq for UnknownMaterial {}

impl Hash for UnknownMaterial {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.category.hash(state);
        for byte in self.folded() {
            state.write_u8(byte);
        }
    }
}

impl Ord for UnknownMaterial {
    fn cmp(&self, other: &Self) -> Ordering {
        self.category
            .cmp(&other.category)
            .then_with(|| self.folded().cmp(other.folded()))
    }
}

impl PartialOrd for UnknownMaterial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
