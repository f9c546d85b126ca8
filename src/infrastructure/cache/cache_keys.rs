pub fn wallet_balance_key(address: &str) -> String {
    format!("wallet:{}", address)
}
