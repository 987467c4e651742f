use crate::constants::DEFAULT_TRANSFER_FEE;
use crate::provider::AddChainParams;
use ethers::types::Address;

#[derive(Debug, Clone, Copy)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

/// Static descriptor for one supported chain. Populated once at process
/// start, immutable thereafter.
///
/// `contract: None` means the NFT contract is not deployed there and the
/// chain must never be offered as a mint or transfer target.
/// `routing_token: None` means the zero-address convention applies when
/// this chain is a transfer destination (the hub case).
#[derive(Debug, Clone, Copy)]
pub struct ChainDescriptor {
    pub chain_id: &'static str,
    pub chain_id_hex: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub currency: NativeCurrency,
    pub rpc_url: &'static str,
    pub fallback_rpc_urls: &'static [&'static str],
    pub explorer: &'static str,
    pub contract: Option<&'static str>,
    pub routing_token: Option<&'static str>,
    pub group: &'static str,
    pub hub: bool,
    /// Native amount attached to a cross-chain transfer leaving this
    /// chain, sized to its gas economics. Configuration, not derived.
    pub transfer_fee: &'static str,
}

impl ChainDescriptor {
    pub fn contract_address(&self) -> Option<Address> {
        self.contract
            .and_then(|raw| raw.parse::<Address>().ok())
            .filter(|addr| !addr.is_zero())
    }

    pub fn routing_token_address(&self) -> Option<Address> {
        self.routing_token
            .and_then(|raw| raw.parse::<Address>().ok())
            .filter(|addr| !addr.is_zero())
    }

    /// EIP-3085 parameters for `wallet_addEthereumChain`.
    pub fn add_chain_params(&self) -> AddChainParams {
        AddChainParams {
            chain_id: self.chain_id_hex.to_string(),
            chain_name: self.name.to_string(),
            native_currency: crate::provider::CurrencyParams {
                name: self.currency.name.to_string(),
                symbol: self.currency.symbol.to_string(),
                decimals: self.currency.decimals,
            },
            rpc_urls: vec![self.rpc_url.to_string()],
            block_explorer_urls: vec![self.explorer.to_string()],
        }
    }
}

pub static SUPPORTED_CHAINS: [ChainDescriptor; 7] = [
    ChainDescriptor {
        chain_id: "7001",
        chain_id_hex: "0x1b59",
        name: "ZetaChain Athens",
        icon: "⚡",
        currency: NativeCurrency { name: "ZETA", symbol: "ZETA", decimals: 18 },
        rpc_url: "https://zetachain-athens-evm.blockpi.network/v1/rpc/public",
        fallback_rpc_urls: &["https://zetachain-athens.g.allthatnode.com/archive/evm"],
        explorer: "https://athens.explorer.zetachain.com",
        contract: Some("0x433c5f951460a539FE431c54b1bfF249F5eFd4F5"),
        routing_token: None,
        group: "zeta-testnet",
        hub: true,
        transfer_fee: "0.5",
    },
    ChainDescriptor {
        chain_id: "11155111",
        chain_id_hex: "0xaa36a7",
        name: "Ethereum Sepolia",
        icon: "🔷",
        currency: NativeCurrency { name: "ETH", symbol: "ETH", decimals: 18 },
        rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
        fallback_rpc_urls: &["https://rpc.sepolia.org"],
        explorer: "https://sepolia.etherscan.io",
        contract: Some("0xe1eEa3ACeD7ba7c4d80F7989DAb402E6b611e8B5"),
        routing_token: Some("0x05BA149A7bd6dC1F937fA9046A9e05C05f3b18b0"),
        group: "zeta-testnet",
        hub: false,
        transfer_fee: "0.005",
    },
    ChainDescriptor {
        chain_id: "80002",
        chain_id_hex: "0x13882",
        name: "Polygon Amoy",
        icon: "🟣",
        currency: NativeCurrency { name: "MATIC", symbol: "MATIC", decimals: 18 },
        rpc_url: "https://rpc-amoy.polygon.technology",
        fallback_rpc_urls: &["https://polygon-amoy-bor-rpc.publicnode.com"],
        explorer: "https://amoy.polygonscan.com",
        contract: Some("0x3D4e79a6180B349ec3f6C33D5c47da217E7aD7E4"),
        routing_token: Some("0x777915D031d1e8144c90D025C594b3b8Bf07a08d"),
        group: "zeta-testnet",
        hub: false,
        transfer_fee: "1.0",
    },
    ChainDescriptor {
        chain_id: "421614",
        chain_id_hex: "0x66eee",
        name: "Arbitrum Sepolia",
        icon: "🔷",
        currency: NativeCurrency { name: "ETH", symbol: "ETH", decimals: 18 },
        rpc_url: "https://sepolia-rollup.arbitrum.io/rpc",
        fallback_rpc_urls: &["https://arbitrum-sepolia-rpc.publicnode.com"],
        explorer: "https://sepolia.arbiscan.io",
        contract: Some("0x1cf3A60860401F26d2b8393616Fe08f3Cd6Db603"),
        routing_token: Some("0x1de70f3e971B62A0707dA18100392af14f7fB677"),
        group: "zeta-testnet",
        hub: false,
        transfer_fee: "0.005",
    },
    ChainDescriptor {
        chain_id: "97",
        chain_id_hex: "0x61",
        name: "BSC Testnet",
        icon: "🟡",
        currency: NativeCurrency { name: "BNB", symbol: "BNB", decimals: 18 },
        rpc_url: "https://data-seed-prebsc-1-s1.binance.org:8545",
        fallback_rpc_urls: &[
            "https://bsc-testnet-rpc.publicnode.com",
            "https://data-seed-prebsc-2-s1.binance.org:8545",
        ],
        explorer: "https://testnet.bscscan.com",
        contract: Some("0x7F010b6b1eBc01C02f6689dfBCffe6819043A398"),
        routing_token: Some("0xd97B1de3619ed2c6BEb3860147E30cA8A7dC9891"),
        group: "zeta-testnet",
        hub: false,
        transfer_fee: "0.01",
    },
    ChainDescriptor {
        chain_id: "1001",
        chain_id_hex: "0x3e9",
        name: "Kaia Testnet",
        icon: "🌸",
        currency: NativeCurrency { name: "KAIA", symbol: "KAIA", decimals: 18 },
        rpc_url: "https://public-en-kairos.node.kaia.io",
        fallback_rpc_urls: &["https://kaia-kairos.blockpi.network/v1/rpc/public"],
        explorer: "https://kairos.kaiascan.io",
        contract: Some("0xb9b01938B8c9ed745444dc91a402365A3A7833C5"),
        routing_token: Some("0xe1A4f44b12eb72DC6da556Be9Ed1185141d7C23c"),
        group: "zeta-testnet",
        hub: false,
        transfer_fee: "20.0",
    },
    ChainDescriptor {
        chain_id: "43113",
        chain_id_hex: "0xa869",
        name: "Avalanche Fuji",
        icon: "🔺",
        currency: NativeCurrency { name: "AVAX", symbol: "AVAX", decimals: 18 },
        rpc_url: "https://api.avax-test.network/ext/bc/C/rpc",
        fallback_rpc_urls: &["https://avalanche-fuji-c-chain-rpc.publicnode.com"],
        explorer: "https://testnet.snowtrace.io",
        contract: Some("0x861C31645AC69e35e8E83c3507681E4C110307FB"),
        routing_token: Some("0xEe9CC614D03e7Dbe994b514079f4914a605B4719"),
        group: "zeta-testnet",
        hub: false,
        transfer_fee: "0.1",
    },
];

pub fn chain(chain_id: &str) -> Option<&'static ChainDescriptor> {
    SUPPORTED_CHAINS.iter().find(|c| c.chain_id == chain_id)
}

pub fn chain_name(chain_id: &str) -> &'static str {
    chain(chain_id).map(|c| c.name).unwrap_or("Unknown Network")
}

/// Chains eligible for minting and discovery: deployed, non-zero contract.
pub fn chains_with_contract() -> impl Iterator<Item = &'static ChainDescriptor> {
    SUPPORTED_CHAINS
        .iter()
        .filter(|c| c.contract_address().is_some())
}

/// Source-keyed fee table lookup; unlisted chains fall back to the default.
pub fn transfer_fee(chain_id: &str) -> &'static str {
    chain(chain_id)
        .map(|c| c.transfer_fee)
        .unwrap_or(DEFAULT_TRANSFER_FEE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn lookup_by_decimal_id() {
        assert_eq!(chain("7001").map(|c| c.name), Some("ZetaChain Athens"));
        assert!(chain("1").is_none());
        assert_eq!(chain_name("999999"), "Unknown Network");
    }

    #[test]
    fn hex_and_decimal_ids_agree() {
        for chain in &SUPPORTED_CHAINS {
            let decimal: u64 = chain.chain_id.parse().unwrap();
            let hex = u64::from_str_radix(chain.chain_id_hex.trim_start_matches("0x"), 16).unwrap();
            assert_eq!(decimal, hex, "{}", chain.name);
        }
    }

    #[test]
    fn exactly_one_hub_per_group() {
        let hubs: Vec<_> = SUPPORTED_CHAINS.iter().filter(|c| c.hub).collect();
        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0].chain_id, "7001");
        assert!(hubs[0].routing_token_address().is_none());
    }

    #[test]
    fn every_chain_has_group_and_valid_endpoints() {
        for chain in &SUPPORTED_CHAINS {
            assert!(!chain.group.is_empty(), "{}", chain.name);
            assert!(Url::parse(chain.rpc_url).is_ok(), "{}", chain.rpc_url);
            for url in chain.fallback_rpc_urls {
                assert!(Url::parse(url).is_ok(), "{}", url);
            }
        }
    }

    #[test]
    fn all_configured_contracts_parse() {
        assert_eq!(chains_with_contract().count(), SUPPORTED_CHAINS.len());
        for chain in chains_with_contract() {
            assert!(chain.contract_address().is_some(), "{}", chain.name);
        }
    }

    #[test]
    fn fee_lookup_defaults_for_unknown_source() {
        assert_eq!(transfer_fee("7001"), "0.5");
        assert_eq!(transfer_fee("1001"), "20.0");
        assert_eq!(transfer_fee("424242"), crate::constants::DEFAULT_TRANSFER_FEE);
    }

    #[test]
    fn zero_or_missing_contract_is_not_eligible() {
        let mut blank = SUPPORTED_CHAINS[0];
        blank.contract = None;
        assert!(blank.contract_address().is_none());
        blank.contract = Some("0x0000000000000000000000000000000000000000");
        assert!(blank.contract_address().is_none());
    }

    #[test]
    fn add_chain_params_mirror_descriptor() {
        let params = chain("43113").unwrap().add_chain_params();
        assert_eq!(params.chain_id, "0xa869");
        assert_eq!(params.chain_name, "Avalanche Fuji");
        assert_eq!(params.native_currency.symbol, "AVAX");
        assert_eq!(params.rpc_urls.len(), 1);
    }
}
