use crate::error::{AppError, Result};
use ethers::prelude::abigen;
use ethers::types::{TransactionReceipt, U64};

// Typed bindings for the per-chain NFT contract. The same interface is
// deployed on the hub and on every connected chain; `transferCrossChain`
// escrows/burns locally and the off-client protocol mints on the
// destination.
abigen!(
    MeluriNft,
    r#"[
        function mint(address to, string uri)
        function transferCrossChain(uint256 tokenId, address receiver, address destination) payable returns (bytes32)
        function ownerOf(uint256 tokenId) view returns (address)
        function tokenURI(uint256 tokenId) view returns (string)
        function balanceOf(address owner) view returns (uint256)
        function tokenOfOwnerByIndex(address owner, uint256 index) view returns (uint256)
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId)
    ]"#
);

/// A mined receipt still carries the EVM outcome; status 0 means the
/// transaction reverted. Pre-Byzantium receipts have no status field and
/// are treated as success.
pub(crate) fn ensure_succeeded(receipt: &TransactionReceipt) -> Result<()> {
    if receipt.status == Some(U64::zero()) {
        return Err(AppError::OnChain(format!(
            "transaction {:?} reverted on-chain",
            receipt.transaction_hash
        )));
    }
    Ok(())
}
