use serde::{Deserialize, Serialize};

/// 股票代码目录中的一条记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub symbol: String,
    pub name: String,
    pub sector: String,
}

impl Company {
    pub fn new(symbol: &str, name: &str, sector: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            sector: sector.to_string(),
        }
    }
}

/// 内置的 12 支股票，按插入顺序排列
pub fn default_companies() -> Vec<Company> {
    vec![
        Company::new("RELIANCE.NS", "Reliance Industries Limited", "Energy"),
        Company::new("TCS.NS", "Tata Consultancy Services", "IT"),
        Company::new("INFY.NS", "Infosys Limited", "IT"),
        Company::new("HDFCBANK.NS", "HDFC Bank Limited", "Banking"),
        Company::new("ICICIBANK.NS", "ICICI Bank Limited", "Banking"),
        Company::new("HINDUNILVR.NS", "Hindustan Unilever Limited", "FMCG"),
        Company::new("BHARTIARTL.NS", "Bharti Airtel Limited", "Telecom"),
        Company::new("ITC.NS", "ITC Limited", "FMCG"),
        Company::new("KOTAKBANK.NS", "Kotak Mahindra Bank", "Banking"),
        Company::new("LT.NS", "Larsen & Toubro Limited", "Engineering"),
        Company::new("WIPRO.NS", "Wipro Limited", "IT"),
        Company::new("MARUTI.NS", "Maruti Suzuki India Limited", "Automotive"),
    ]
}
