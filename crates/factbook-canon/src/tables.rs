//! Built-in curated tables. [`RuleSet::builtin`](crate::rules::RuleSet::builtin)
//! loads these; a rules file can extend them.

use factbook_core::entity::EntityType;

// ─── Field names ─────────────────────────────────────────────────────────────

/// Historical name → modern canonical name.
pub(crate) const KNOWN_RENAMES: &[(&str, &str)] = &[
  // ── 1990–1996 ──
  ("Agriculture", "Agricultural products"),
  ("Comparative area", "Area - comparative"),
  ("Total area", "Area"),
  ("Ethnic divisions", "Ethnic groups"),
  ("Language", "Languages"),
  ("Religion", "Religions"),
  ("Disputes", "Disputes - international"),
  ("International disputes", "Disputes - international"),
  ("Environment", "Environment - current issues"),
  ("Type", "Government type"),
  ("Type of government", "Government type"),
  ("Leaders", "Executive branch"),
  ("Branches", "Military and security forces"),
  ("Overview", "Economic overview"),
  ("Telecommunications", "Telecommunication systems"),
  ("Railroads", "Railways"),
  ("Highways", "Roadways"),
  ("Organized labor", "Organized labor"),
  ("National product", "Real GDP (purchasing power parity)"),
  ("National product per capita", "Real GDP per capita"),
  ("National product real growth rate", "Real GDP growth rate"),
  ("US diplomatic representation", "Diplomatic representation from the US"),
  ("Diplomatic representation in US", "Diplomatic representation in the US"),
  ("Civil air", "Civil air"),
  ("Airfield", "Airports"),
  ("Airport", "Airports"),
  ("Defense expenditures", "Military expenditures"),
  ("Unemployment", "Unemployment rate"),
  ("Television", "Broadcast media"),
  ("Televisions", "Televisions"),
  ("Aid", "Aid"),
  ("Diplomatic representation", "Diplomatic representation in the US"),
  ("Land area", "Area"),
  ("Territorial sea", "Maritime claims"),
  // ── later editions ──
  ("Economy - overview", "Economic overview"),
  ("Agriculture - products", "Agricultural products"),
  ("GDP (purchasing power parity)", "Real GDP (purchasing power parity)"),
  ("GDP - real growth rate", "Real GDP growth rate"),
  ("GDP real growth rate", "Real GDP growth rate"),
  ("GDP - per capita", "Real GDP per capita"),
  ("GDP - per capita (PPP)", "Real GDP per capita"),
  ("GDP per capita", "Real GDP per capita"),
  ("GDP", "Real GDP (purchasing power parity)"),
  ("GDP composition by sector", "GDP - composition, by sector of origin"),
  ("GDP - composition by sector", "GDP - composition, by sector of origin"),
  ("Elevation extremes", "Elevation"),
  ("Telephone system", "Telecommunication systems"),
  ("Telephones - main lines in use", "Telephones - fixed lines"),
  ("Telephones", "Telephones - fixed lines"),
  ("telephone", "Telephones - fixed lines"),
  (
    "Distribution of family income - Gini index",
    "Gini Index coefficient - distribution of family income",
  ),
  ("Unemployment, youth ages 15-24", "Youth unemployment rate (ages 15-24)"),
  ("Military branches", "Military and security forces"),
  ("Maternal mortality rate", "Maternal mortality ratio"),
  ("Physicians density", "Physician density"),
  ("Radio broadcast stations", "Broadcast media"),
  ("Television broadcast stations", "Broadcast media"),
  ("Television-broadcast stations", "Broadcast media"),
  ("Radio", "Broadcast media"),
  ("Radios", "Radios"),
  (
    "Environment - international agreements",
    "International environmental agreements",
  ),
  ("Ports and terminals", "Ports"),
  ("Ports and harbors", "Ports"),
  ("National anthem", "National anthem(s)"),
  ("Political parties and leaders", "Political parties"),
  ("Political pressure groups and leaders", "Political parties"),
  ("Flag description", "Flag"),
  ("Waterways", "Waterways"),
  ("Inland waterways", "Waterways"),
  ("Area Rankings", "Area - rankings"),
  (
    "Reserves of foreign exchange & gold",
    "Reserves of foreign exchange and gold",
  ),
  ("Transportation note", "Transportation - note"),
  ("Education expenditures", "Education expenditure"),
  ("Health expenditures", "Health expenditure"),
  ("Currency", "Exchange rates"),
  ("Currency code", "Exchange rates"),
  ("Currency (code)", "Exchange rates"),
  (
    "Carbon dioxide emissions from consumption of energy",
    "Carbon dioxide emissions",
  ),
  ("Terrorist groups - foreign based", "Terrorist group(s)"),
  ("Terrorist groups - home based", "Terrorist group(s)"),
  ("External debt", "Debt - external"),
  ("Geographic note", "Geography - note"),
  ("Defense note", "Military - note"),
  ("Government note", "Government - note"),
  ("Communications note", "Communications - note"),
  ("Name of country", "Country name"),
  ("Names", "Country name"),
  ("Long-form name", "Country name"),
  ("National capital", "Capital"),
  ("National holidays", "National holiday"),
  ("Exchange rate", "Exchange rates"),
  ("Industrial production", "Industrial production growth rate"),
  ("Industry", "Industries"),
  ("Land boundary", "Land boundaries"),
  ("Manpower availability", "Manpower availability"),
  ("GNP", "GNP"),
  ("Growth rate (population)", "Population growth rate"),
  ("Current Health Expenditure", "Current health expenditure"),
  (
    "GDP (purchasing power parity) - real",
    "Real GDP (purchasing power parity)",
  ),
  (
    "Inflation rate - consumer price index",
    "Inflation rate (consumer prices)",
  ),
  ("Major cities - population", "Major urban areas - population"),
  ("Head of Government", "Executive branch"),
  ("Chief of State", "Executive branch"),
  ("Elections", "Executive branch"),
  ("Member of", "International organization participation"),
  ("Other political or pressure groups", "Political parties"),
  ("Other political pressure groups", "Political parties"),
  ("Other political groups", "Political parties"),
  ("Current issues", "Environment - current issues"),
  ("Dependent area", "Dependency status"),
  ("Economic aid - donor", "Economic aid"),
  ("Economic aid - recipient", "Economic aid"),
  ("Communists", "Political parties"),
  ("Legislature", "Legislative branch"),
  ("Telephone", "Telecommunication systems"),
  ("Internet", "Internet users"),
  ("Internet Service Providers (ISPs)", "Internet users"),
  ("Internet hosts", "Internet users"),
  ("FAX", "Diplomatic representation in the US"),
  // ── fields dropped before the modern editions; kept under their own name ──
  ("Airports - with paved runways", "Airports - with paved runways"),
  ("Airports - with unpaved runways", "Airports - with unpaved runways"),
  ("Fiscal year", "Fiscal year"),
  ("Icebreakers", "Icebreakers"),
  ("HIV/AIDS - adult prevalence rate", "HIV/AIDS - adult prevalence rate"),
  ("HIV/AIDS - deaths", "HIV/AIDS - deaths"),
  (
    "HIV/AIDS - people living with HIV/AIDS",
    "HIV/AIDS - people living with HIV/AIDS",
  ),
  ("Stock of broad money", "Stock of broad money"),
  ("Stock of narrow money", "Stock of narrow money"),
  ("Stock of money", "Stock of narrow money"),
  ("Stock of quasi money", "Stock of narrow money"),
  ("Stock of domestic credit", "Stock of domestic credit"),
  (
    "Market value of publicly traded shares",
    "Market value of publicly traded shares",
  ),
  ("Commercial bank prime lending rate", "Commercial bank prime lending rate"),
  ("Central bank discount rate", "Central bank discount rate"),
  ("Investment (gross fixed)", "Investment (gross fixed)"),
  ("Population - distribution", "Population distribution"),
  ("Population below poverty line", "Population below poverty line"),
  (
    "Freshwater withdrawal (domestic/industrial/agricultural)",
    "Total water withdrawal",
  ),
  ("Major infectious diseases", "Major infectious diseases"),
];

/// Sub-field → parent aggregate. Rows are tagged, never merged.
pub(crate) const CONSOLIDATION: &[(&str, &str)] = &[
  ("Oil - production", "Petroleum"),
  ("Oil - consumption", "Petroleum"),
  ("Oil - exports", "Petroleum"),
  ("Oil - imports", "Petroleum"),
  ("Oil - proved reserves", "Petroleum"),
  ("Crude oil - production", "Petroleum"),
  ("Crude oil - exports", "Petroleum"),
  ("Crude oil - imports", "Petroleum"),
  ("Crude oil - proved reserves", "Petroleum"),
  ("Refined petroleum products - production", "Petroleum"),
  ("Refined petroleum products - consumption", "Petroleum"),
  ("Refined petroleum products - exports", "Petroleum"),
  ("Refined petroleum products - imports", "Petroleum"),
  ("Natural gas - production", "Natural gas"),
  ("Natural gas - consumption", "Natural gas"),
  ("Natural gas - exports", "Natural gas"),
  ("Natural gas - imports", "Natural gas"),
  ("Natural gas - proved reserves", "Natural gas"),
  ("Electricity - production", "Electricity"),
  ("Electricity - consumption", "Electricity"),
  ("Electricity - exports", "Electricity"),
  ("Electricity - imports", "Electricity"),
  ("Electricity - installed generating capacity", "Electricity"),
  ("Electricity - capacity", "Electricity"),
  ("Electricity - from fossil fuels", "Electricity generation sources"),
  ("Electricity - from hydroelectric plants", "Electricity generation sources"),
  ("Electricity - from nuclear fuels", "Electricity generation sources"),
  (
    "Electricity - from other renewable sources",
    "Electricity generation sources",
  ),
  ("Electricity - production by source", "Electricity generation sources"),
  ("Electricity production by source", "Electricity generation sources"),
  ("Electricity - consumption per capita", "Energy consumption per capita"),
  (
    "Military manpower - availability",
    "Military and security service personnel strengths",
  ),
  (
    "Military manpower - fit for military service",
    "Military and security service personnel strengths",
  ),
  (
    "Military manpower - reaching military age annually",
    "Military service age and obligation",
  ),
  (
    "Military manpower - military age",
    "Military service age and obligation",
  ),
  (
    "Military manpower - military age and obligation",
    "Military service age and obligation",
  ),
  (
    "Manpower available for military service",
    "Military and security service personnel strengths",
  ),
  (
    "Manpower fit for military service",
    "Military and security service personnel strengths",
  ),
  (
    "Manpower reaching military service age annually",
    "Military service age and obligation",
  ),
  (
    "Manpower reaching militarily significant age annually",
    "Military service age and obligation",
  ),
  ("Military expenditures - dollar figure", "Military expenditures"),
  ("Military expenditures - percent of GDP", "Military expenditures"),
  (
    "Military manpower",
    "Military and security service personnel strengths",
  ),
  ("Contiguous zone", "Maritime claims"),
  ("Continental shelf", "Maritime claims"),
  ("Exclusive economic zone", "Maritime claims"),
  ("Exclusive fishing zone", "Maritime claims"),
  ("Extended economic zone", "Maritime claims"),
  ("Gulf of Sidra closing line", "Maritime claims"),
  ("Military boundary line", "Maritime claims"),
];

/// Substrings naming a country-specific legislative or governing body.
pub(crate) const GOV_BODY_KEYWORDS: &[&str] = &[
  "Assembly",
  "Senate",
  "Parliament",
  "Congress",
  "Council",
  "Chamber",
  "House of",
  "Duma",
  "Diet",
  "Sejm",
  "Seimas",
  "Storting",
  "Bundestag",
  "Bundesrat",
  "Majlis",
  "Shura",
  "Tribunal",
  "Court",
  "Staten",
  "Knesset",
  "Hural",
  "Sobranje",
  "Soviet",
  "Keneshom",
  "Folketing",
  "Fono",
  "Legislative Yuan",
  "Lagting",
  "Majilis",
  "Presidential Administration",
  "Group of Assistants",
  "Armed Forces",
  "KRAF",
];

/// Generic label given to names matching [`GOV_BODY_KEYWORDS`].
pub(crate) const GOV_BODY_CANONICAL: &str = "Legislative branch";

/// Fragments of running prose that leaked into field-name position.
pub(crate) const NOISE_PHRASES: &[&str] = &[
  "consists mainly of",
  "includes the following",
  "seat distribution",
  "coalition of",
  "made up of",
  "as follows",
  "countries have figures",
  "underdeveloped countries",
  "undeveloped countries",
  "search for",
  "mailing address",
  "were held at",
  "mutually supportive",
  "types of finished intelligence",
  "may be categorized",
  "pending acceptable definition",
  "one additional caution",
  "real output has remained",
  "party ruling coalition",
  "anti-market and",
  "union, two german",
  "factbook that may",
  "acceptable definition of the boundaries",
  "comments and queries are welcome",
];

/// Keywords marking 1990s party and faction names used as field names.
pub(crate) const PARTY_KEYWORDS: &[&str] = &[
  "parties",
  "bloc",
  "rightist",
  "leftist",
  "populist",
  "resistance forces",
  "ruling coalition",
  "umbrella group",
  "africans",
  "people's army",
];

/// Sub-field labels that older editions promoted to field names.
pub(crate) const SUB_FIELD_LABELS: &[&str] = &[
  "adjective",
  "arable land",
  "by occupation",
  "cabinet",
  "capacity",
  "chancery",
  "chief of mission",
  "chief of state",
  "chief of state and head of government",
  "commodities",
  "consulate(s)",
  "consulate(s) general",
  "consumption per capita",
  "conventional long form",
  "conventional short form",
  "donor",
  "eastern",
  "embassy",
  "expenditures",
  "female",
  "forest and woodland",
  "former",
  "international agreements",
  "local long form",
  "local short form",
  "male",
  "meadows and pastures",
  "noun",
  "other",
  "partners",
  "paved",
  "permanent crops",
  "production",
  "recipient",
  "revenues",
  "total",
  "total population",
  "unpaved",
  "usable",
  "western",
  "south",
  "southeast",
  "southwest",
  "north",
  "northeast",
  "northwest",
  "head of government",
  "election results",
  "elections",
  "water area",
  "branch office",
  "undifferentiated",
  "tatal population",
  "western-donor",
  "business organizations",
  "supreme leader and functional chief of state",
];

/// Regional sub-entries (split islands, partitioned areas, currency notes).
pub(crate) const REGIONAL_ENTRIES: &[&str] = &[
  "Turkish Area",
  "Turkish area",
  "Turkish Cypriot area",
  "Turkish area - agriculture",
  "Turkish area - industry",
  "Turkish area - paved",
  "Turkish area - services",
  "Turkish area - total",
  "Turkish area - unpaved",
  "Turkish sector",
  "Serbia",
  "Serbia - 0-14 years",
  "Serbia - 15-64 years",
  "Serbia - 65 years and over",
  "Serbia - all ages",
  "Serbia - at birth",
  "Serbia - female",
  "Serbia - male",
  "Serbia - males age 15-49",
  "Serbia - males fit for military service",
  "Serbia - total population",
  "Serbia - under 15 years",
  "Montenegro",
  "Montenegro - 0-14 years",
  "Montenegro - 15-64 years",
  "Montenegro - 65 years and over",
  "Montenegro - all ages",
  "Montenegro - at birth",
  "Montenegro - female",
  "Montenegro - male",
  "Montenegro - males age 15-49",
  "Montenegro - males fit for military service",
  "Montenegro - males reach military age (19) annually",
  "Montenegro - total population",
  "Montenegro - under 15 years",
  "Greek area",
  "Greek area - agriculture",
  "Greek area - industry",
  "Greek area - paved",
  "Greek area - recipient",
  "Greek area - services",
  "Greek area - total",
  "Greek area - unpaved",
  "Greek sector",
  "Greek Cypriot",
  "Cypriot area",
  "Sabah",
  "Sarawak",
  "Peninsular Malaysia",
  "Bonaire",
  "Sint Eustatius",
  "Sint Maarten",
  "Saba",
  "Curacao",
  "England",
  "Northern Ireland",
  "Wales",
  "Scotland",
  "Zanzibar",
  "West Island",
  "Home Island",
  "Republika Srpska",
  "Republic",
  "Swiss nationals",
  "Germany",
  "Herzegovina",
  "Morocco",
  "Canadian dollars",
  "French francs",
  "German deutsche marks",
  "Italian lire",
  "Japanese yen",
  "British pounds",
  "Summer (January) population",
  "Winter (July) population",
  "Summer only stations",
  "Summer-only stations",
  "Year-round stations",
];

/// Appendix, glossary and front-matter headings.
pub(crate) const MISC_REFERENCE: &[&str] = &[
  "Appendixes",
  "Antarctic Treaty Summary",
  "Terminology",
  "Telephone numbers",
  "Reference maps",
  "Transnational Issues",
  "Transportation",
  "United Nations System",
  "Web uniform resource locator (URL)",
  "Weights and measures",
  "ACIC M 49-1",
  "Abbreviation",
  "Abbreviations",
  "Affiliation",
  "Data code",
  "Digraph",
  "Years",
  "Shipyards and Ship Building",
  "Dates of information",
  "Entities",
  "Money figures",
  "FIPS 10-4",
  "ISO 3166",
  "IHO 23-3rd",
  "IHO 23-4th",
  "DIAM 65-18",
  "Country map",
  "Flag graphic",
  "Geographic names",
  "Maps",
  "GDP methodology",
  "GNP/GDP methodology",
  "Gross domestic product",
  "Gross domestic product (GDP)",
  "Gross national product",
  "Gross national product (GNP)",
  "Gross world product",
  "Gross world product (GWP)",
  "GWP (gross world product)",
  "Economy",
  "Geography",
  "People",
  "Communications",
  "Military",
  "Introduction",
  "International organizations",
  "Mail",
  "Note",
  "Notes",
  "Historical perspective",
  "Data codes-country",
  "Data codes-hydrographic",
  "Digraphs",
  "Member",
  "Environmental Agreements and Appendix E",
  "Environmental agreements",
  "Other agreements",
];

// ─── Entities ────────────────────────────────────────────────────────────────

/// Retired codes folded into their modern successor.
pub(crate) const CODE_ALIASES: &[(&str, &str)] = &[
  ("TC", "AE"),
  ("FA", "FK"),
  ("RB", "RI"),
  ("SR", "YI"),
  ("SK", "NN"),
  ("VA", "VT"),
  ("SS", "OD"),
];

/// Historical (lower-case) names → the current canonical (lower-case) name.
pub(crate) const NAME_ALIASES: &[(&str, &str)] = &[
  ("burma", "myanmar"),
  ("ivory coast", "cote d'ivoire"),
  ("zaire", "congo, democratic republic of the"),
  ("czech republic", "czechia"),
  ("swaziland", "eswatini"),
  ("macedonia", "north macedonia"),
  ("the bahamas", "bahamas, the"),
  ("bahamas", "bahamas, the"),
  ("the gambia", "gambia, the"),
  ("gambia", "gambia, the"),
];

/// Entities whose classification cannot be read off their own text.
pub(crate) const CLASSIFICATION_OVERRIDES: &[(&str, EntityType)] = &[
  ("XQ", EntityType::Misc),
  ("ZH", EntityType::Misc),
  ("XO", EntityType::Misc),
  ("ZN", EntityType::Misc),
  ("OO", EntityType::Misc),
  ("XX", EntityType::Misc),
  ("EE", EntityType::Misc),
  ("KV", EntityType::Disputed),
  ("GZ", EntityType::Disputed),
  ("WE", EntityType::Disputed),
  ("PF", EntityType::Disputed),
  ("PG", EntityType::Disputed),
  ("PJ", EntityType::Disputed),
  ("WI", EntityType::Disputed),
  ("AX", EntityType::Territory),
  ("DX", EntityType::Territory),
  ("HK", EntityType::SpecialAdmin),
  ("MC", EntityType::SpecialAdmin),
  ("GK", EntityType::CrownDependency),
  ("JE", EntityType::CrownDependency),
  ("IM", EntityType::CrownDependency),
  ("RM", EntityType::FreelyAssociated),
  ("FM", EntityType::FreelyAssociated),
  ("PS", EntityType::FreelyAssociated),
  ("AY", EntityType::Antarctic),
  ("NT", EntityType::Dissolved),
  ("YI", EntityType::Dissolved),
  ("BS", EntityType::Territory),
  ("EU", EntityType::Territory),
  ("GO", EntityType::Territory),
  ("JU", EntityType::Territory),
  ("TE", EntityType::Territory),
  ("ZZ", EntityType::Territory),
  ("IP", EntityType::Territory),
  ("FQ", EntityType::Territory),
  ("HQ", EntityType::Territory),
  ("DQ", EntityType::Territory),
  ("JQ", EntityType::Territory),
  ("KQ", EntityType::Territory),
  ("MQ", EntityType::Territory),
  ("LQ", EntityType::Territory),
  ("WQ", EntityType::Territory),
  ("BQ", EntityType::Territory),
  ("UM", EntityType::Territory),
  ("VT", EntityType::Sovereign),
];

/// Administering powers as named in "Dependency status" text → their code.
pub(crate) const ADMINISTERING_POWERS: &[(&str, &str)] = &[
  ("united states", "US"),
  ("us", "US"),
  ("united kingdom", "UK"),
  ("uk", "UK"),
  ("france", "FR"),
  ("netherlands", "NL"),
  ("kingdom of the netherlands", "NL"),
  ("denmark", "DA"),
  ("kingdom of denmark", "DA"),
  ("norway", "NO"),
  ("australia", "AS"),
  ("new zealand", "NZ"),
  ("china", "CH"),
  ("people's republic of china", "CH"),
];
