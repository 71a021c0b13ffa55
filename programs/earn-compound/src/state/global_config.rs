use anchor_lang::prelude::*;

/// Global configuration for the compounding staking program
/// PDA: ["global-config"]
#[account]
#[derive(Default)]
pub struct GlobalConfig {
    /// Program authority (creates pools, owns them by default)
    pub authority: Pubkey,

    /// Total number of staking pools created
    pub total_pools: u64,

    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Reserved for future use
    pub _reserved: [u8; 32],
}

impl GlobalConfig {
    pub const SIZE: usize = 8 + // discriminator
        32 + // authority
        8 +  // total_pools
        1 +  // bump
        32;  // reserved
}
