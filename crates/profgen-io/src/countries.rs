//! Country name to ISO 3166-1 alpha-2 lookup for statistics tables that
//! label rows by name.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static NAME_TO_ISO2: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    const TABLE: &[(&str, &str)] = &[
        ("Afghanistan", "AF"),
        ("Albania", "AL"),
        ("Algeria", "DZ"),
        ("American Samoa", "AS"),
        ("Angola", "AO"),
        ("Antarctica", "AQ"),
        ("Antigua and Barbuda", "AG"),
        ("Argentina", "AR"),
        ("Armenia", "AM"),
        ("Aruba", "AW"),
        ("Australia", "AU"),
        ("Austria", "AT"),
        ("Azerbaijan", "AZ"),
        ("Bahamas", "BS"),
        ("Bahamas, The", "BS"),
        ("The Bahamas", "BS"),
        ("Bahrain", "BH"),
        ("Bangladesh", "BD"),
        ("Barbados", "BB"),
        ("Belarus", "BY"),
        ("Belgium", "BE"),
        ("Belize", "BZ"),
        ("Benin", "BJ"),
        ("Bermuda", "BM"),
        ("Bhutan", "BT"),
        ("Bolivia", "BO"),
        ("Bosnia and Herzegovina", "BA"),
        ("Botswana", "BW"),
        ("Brazil", "BR"),
        ("British Virgin Islands", "VG"),
        ("Brunei", "BN"),
        ("Brunei Darussalam", "BN"),
        ("Bulgaria", "BG"),
        ("Burkina Faso", "BF"),
        ("Burma", "MM"),
        ("Myanmar", "MM"),
        ("Burundi", "BI"),
        ("Cabo Verde", "CV"),
        ("Cape Verde", "CV"),
        ("Cambodia", "KH"),
        ("Cameroon", "CM"),
        ("Canada", "CA"),
        ("Cayman Islands", "KY"),
        ("Central African Republic", "CF"),
        ("Chad", "TD"),
        ("Chile", "CL"),
        ("China", "CN"),
        ("Colombia", "CO"),
        ("Comoros", "KM"),
        ("Congo", "CG"),
        ("Congo-Brazzaville", "CG"),
        ("Congo (Brazzaville)", "CG"),
        ("Republic of the Congo", "CG"),
        ("Congo-Kinshasa", "CD"),
        ("Congo (Kinshasa)", "CD"),
        ("Democratic Republic of the Congo", "CD"),
        ("Cook Islands", "CK"),
        ("Costa Rica", "CR"),
        ("Cote d'Ivoire", "CI"),
        ("Côte d'Ivoire", "CI"),
        ("Ivory Coast", "CI"),
        ("Croatia", "HR"),
        ("Cuba", "CU"),
        ("Cyprus", "CY"),
        ("Czechia", "CZ"),
        ("Czech Republic", "CZ"),
        ("Denmark", "DK"),
        ("Djibouti", "DJ"),
        ("Dominica", "DM"),
        ("Dominican Republic", "DO"),
        ("Ecuador", "EC"),
        ("Egypt", "EG"),
        ("El Salvador", "SV"),
        ("Equatorial Guinea", "GQ"),
        ("Eritrea", "ER"),
        ("Estonia", "EE"),
        ("Eswatini", "SZ"),
        ("Swaziland", "SZ"),
        ("Ethiopia", "ET"),
        ("Falkland Islands", "FK"),
        ("Falkland Islands (Islas Malvinas)", "FK"),
        ("Faroe Islands", "FO"),
        ("Fiji", "FJ"),
        ("Finland", "FI"),
        ("France", "FR"),
        ("French Guiana", "GF"),
        ("French Polynesia", "PF"),
        ("Gabon", "GA"),
        ("Gambia", "GM"),
        ("Gambia, The", "GM"),
        ("The Gambia", "GM"),
        ("Georgia", "GE"),
        ("Germany", "DE"),
        ("Ghana", "GH"),
        ("Gibraltar", "GI"),
        ("Greece", "GR"),
        ("Greenland", "GL"),
        ("Grenada", "GD"),
        ("Guadeloupe", "GP"),
        ("Guam", "GU"),
        ("Guatemala", "GT"),
        ("Guinea", "GN"),
        ("Guinea-Bissau", "GW"),
        ("Guyana", "GY"),
        ("Haiti", "HT"),
        ("Honduras", "HN"),
        ("Hong Kong", "HK"),
        ("Hungary", "HU"),
        ("Iceland", "IS"),
        ("India", "IN"),
        ("Indonesia", "ID"),
        ("Iran", "IR"),
        ("Iraq", "IQ"),
        ("Ireland", "IE"),
        ("Israel", "IL"),
        ("Italy", "IT"),
        ("Jamaica", "JM"),
        ("Japan", "JP"),
        ("Jordan", "JO"),
        ("Kazakhstan", "KZ"),
        ("Kenya", "KE"),
        ("Kiribati", "KI"),
        ("Korea, North", "KP"),
        ("North Korea", "KP"),
        ("Korea, South", "KR"),
        ("South Korea", "KR"),
        ("Kosovo", "XK"),
        ("Kuwait", "KW"),
        ("Kyrgyzstan", "KG"),
        ("Laos", "LA"),
        ("Latvia", "LV"),
        ("Lebanon", "LB"),
        ("Lesotho", "LS"),
        ("Liberia", "LR"),
        ("Libya", "LY"),
        ("Lithuania", "LT"),
        ("Luxembourg", "LU"),
        ("Macau", "MO"),
        ("Macao", "MO"),
        ("Madagascar", "MG"),
        ("Malawi", "MW"),
        ("Malaysia", "MY"),
        ("Maldives", "MV"),
        ("Mali", "ML"),
        ("Malta", "MT"),
        ("Martinique", "MQ"),
        ("Mauritania", "MR"),
        ("Mauritius", "MU"),
        ("Mexico", "MX"),
        ("Moldova", "MD"),
        ("Mongolia", "MN"),
        ("Montenegro", "ME"),
        ("Montserrat", "MS"),
        ("Morocco", "MA"),
        ("Mozambique", "MZ"),
        ("Namibia", "NA"),
        ("Nauru", "NR"),
        ("Nepal", "NP"),
        ("Netherlands", "NL"),
        ("New Caledonia", "NC"),
        ("New Zealand", "NZ"),
        ("Nicaragua", "NI"),
        ("Niger", "NE"),
        ("Nigeria", "NG"),
        ("Niue", "NU"),
        ("North Macedonia", "MK"),
        ("Macedonia", "MK"),
        ("Norway", "NO"),
        ("Oman", "OM"),
        ("Pakistan", "PK"),
        ("Palestinian Territories", "PS"),
        ("Palestine", "PS"),
        ("Panama", "PA"),
        ("Papua New Guinea", "PG"),
        ("Paraguay", "PY"),
        ("Peru", "PE"),
        ("Philippines", "PH"),
        ("Poland", "PL"),
        ("Portugal", "PT"),
        ("Puerto Rico", "PR"),
        ("Qatar", "QA"),
        ("Reunion", "RE"),
        ("Réunion", "RE"),
        ("Romania", "RO"),
        ("Russia", "RU"),
        ("Rwanda", "RW"),
        ("Saint Helena", "SH"),
        ("Saint Kitts and Nevis", "KN"),
        ("Saint Lucia", "LC"),
        ("Saint Pierre and Miquelon", "PM"),
        ("Saint Vincent/Grenadines", "VC"),
        ("Saint Vincent and the Grenadines", "VC"),
        ("Samoa", "WS"),
        ("Sao Tome and Principe", "ST"),
        ("Saudi Arabia", "SA"),
        ("Senegal", "SN"),
        ("Serbia", "RS"),
        ("Seychelles", "SC"),
        ("Sierra Leone", "SL"),
        ("Singapore", "SG"),
        ("Slovakia", "SK"),
        ("Slovenia", "SI"),
        ("Solomon Islands", "SB"),
        ("Somalia", "SO"),
        ("South Africa", "ZA"),
        ("South Sudan", "SS"),
        ("Spain", "ES"),
        ("Sri Lanka", "LK"),
        ("Sudan", "SD"),
        ("Suriname", "SR"),
        ("Sweden", "SE"),
        ("Switzerland", "CH"),
        ("Syria", "SY"),
        ("Taiwan", "TW"),
        ("Tajikistan", "TJ"),
        ("Tanzania", "TZ"),
        ("Thailand", "TH"),
        ("Timor-Leste", "TL"),
        ("East Timor", "TL"),
        ("Togo", "TG"),
        ("Tonga", "TO"),
        ("Trinidad and Tobago", "TT"),
        ("Tunisia", "TN"),
        ("Turkey", "TR"),
        ("Turkiye", "TR"),
        ("Türkiye", "TR"),
        ("Turkmenistan", "TM"),
        ("Turks and Caicos Islands", "TC"),
        ("Tuvalu", "TV"),
        ("Uganda", "UG"),
        ("Ukraine", "UA"),
        ("United Arab Emirates", "AE"),
        ("United Kingdom", "GB"),
        ("United States", "US"),
        ("U.S. Virgin Islands", "VI"),
        ("Uruguay", "UY"),
        ("Uzbekistan", "UZ"),
        ("Vanuatu", "VU"),
        ("Venezuela", "VE"),
        ("Vietnam", "VN"),
        ("Viet Nam", "VN"),
        ("Western Sahara", "EH"),
        ("Yemen", "YE"),
        ("Zambia", "ZM"),
        ("Zimbabwe", "ZW"),
    ];
    TABLE
        .iter()
        .map(|(name, code)| (name.to_lowercase(), *code))
        .collect()
});

/// ISO2 code for a country name, matched case-insensitively.
pub fn iso2_from_name(name: &str) -> Option<&'static str> {
    NAME_TO_ISO2.get(&name.trim().to_lowercase()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_common_spellings() {
        assert_eq!(iso2_from_name("Nigeria"), Some("NG"));
        assert_eq!(iso2_from_name("  congo-kinshasa "), Some("CD"));
        assert_eq!(iso2_from_name("Cote d'Ivoire"), Some("CI"));
        assert_eq!(iso2_from_name("Kosovo"), Some("XK"));
        assert_eq!(iso2_from_name("Atlantis"), None);
    }
}
