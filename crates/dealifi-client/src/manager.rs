//! Candy machine lifecycle orchestration.
//!
//! Chains the program calls for creating, loading and minting from a candy
//! machine, papering over RPC propagation lag with retries, and mirrors mints
//! into the backend.

use serde::{Deserialize, Serialize};

use dealifi_core::{
    CandyItem, CandyMachineConfig, CandyMachineHealth, CandyMachineState, CandyMachineStatus,
    GuardConfig, GuardSet, WalletAddress,
};

use crate::client::DealifiClient;
use crate::error::ClientError;
use crate::program::{
    CandyMachineProgram, CreateCandyMachineArgs, CreateCollectionArgs, MintOutcome, MintRequest,
    ProgramError, Signature, TokenMetadata,
};
use crate::retry::{retry_if, RetryPolicy};
use crate::types::RecordMintRequest;

/// Metadata URI of every collection NFT.
pub const DEFAULT_COLLECTION_URI: &str =
    "https://devnet.irys.xyz/2ncwSrZHdzrsjh85Pmko1YM9jDUNLiVzRiXR6cZ2wGHh";

/// Addresses of a freshly created candy machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCandyMachine {
    /// The candy machine.
    pub candy_machine: WalletAddress,
    /// Its collection NFT mint.
    pub collection: WalletAddress,
}

/// Drives a [`CandyMachineProgram`].
pub struct CandyMachineManager<P> {
    program: P,
    backend: Option<DealifiClient>,
    collection_policy: RetryPolicy,
    fetch_policy: RetryPolicy,
    collection_uri: String,
}

impl<P: CandyMachineProgram> CandyMachineManager<P> {
    /// Create a manager with the default retry schedules and no backend.
    pub fn new(program: P) -> Self {
        Self {
            program,
            backend: None,
            collection_policy: RetryPolicy::COLLECTION_METADATA,
            fetch_policy: RetryPolicy::CANDY_MACHINE_FETCH,
            collection_uri: DEFAULT_COLLECTION_URI.to_string(),
        }
    }

    /// Mirror mints into the backend.
    #[must_use]
    pub fn with_backend(mut self, backend: DealifiClient) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Override the retry schedules.
    #[must_use]
    pub fn with_retry_policies(mut self, collection: RetryPolicy, fetch: RetryPolicy) -> Self {
        self.collection_policy = collection;
        self.fetch_policy = fetch;
        self
    }

    /// Override the collection metadata URI.
    #[must_use]
    pub fn with_collection_uri(mut self, uri: impl Into<String>) -> Self {
        self.collection_uri = uri.into();
        self
    }

    /// The wrapped program.
    pub fn program(&self) -> &P {
        &self.program
    }

    /// Create a collection NFT and a candy machine minting into it.
    ///
    /// # Errors
    ///
    /// - `ClientError::Core` if the symbol makes the name prefix too long.
    /// - `ClientError::AccountNotFound` if the identity wallet is unfunded.
    /// - `ClientError::Program` if a program call fails, including collection
    ///   metadata that never shows up within the retry budget.
    pub async fn create_candy_machine(
        &self,
        config: &CandyMachineConfig,
        guards: Option<&GuardConfig>,
    ) -> Result<CreatedCandyMachine, ClientError> {
        let identity = self.program.identity();
        let config_line_settings = config.config_line_settings()?;

        if !self.program.account_exists(&identity).await? {
            return Err(ClientError::AccountNotFound {
                address: identity.to_string(),
            });
        }

        let collection = self
            .program
            .create_collection(CreateCollectionArgs {
                name: config.collection_name(),
                symbol: config.symbol.clone(),
                uri: self.collection_uri.clone(),
                seller_fee_basis_points: config.seller_fee_basis_points,
                creator: identity,
            })
            .await?;
        tracing::info!(collection = %collection, "Collection created");

        self.fetch_metadata_with_retry(&collection).await?;

        let guards = guards.and_then(|g| g.resolve(identity));
        if let Some(set) = &guards {
            tracing::debug!(guards = ?set.names(), "Attaching guards");
        }

        let candy_machine = self
            .program
            .create_candy_machine(CreateCandyMachineArgs {
                collection_mint: collection,
                authority: identity,
                items_available: config.items_available,
                seller_fee_basis_points: config.seller_fee_basis_points,
                max_edition_supply: config.max_supply,
                is_mutable: config.is_mutable,
                config_line_settings,
                guards,
            })
            .await?;
        tracing::info!(candy_machine = %candy_machine, "Candy machine created");

        Ok(CreatedCandyMachine {
            candy_machine,
            collection,
        })
    }

    /// Append config lines after the ones already loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the candy machine cannot be read or the write fails.
    pub async fn append_config_lines(
        &self,
        candy_machine: &WalletAddress,
        lines: Vec<CandyItem>,
    ) -> Result<Signature, ClientError> {
        let state = self.raw_state(candy_machine).await?;
        self.add_config_lines_at(candy_machine, state.items_loaded, lines)
            .await
    }

    /// Write config lines starting at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn add_config_lines_at(
        &self,
        candy_machine: &WalletAddress,
        index: u64,
        lines: Vec<CandyItem>,
    ) -> Result<Signature, ClientError> {
        let count = lines.len();
        let signature = self
            .program
            .add_config_lines(candy_machine, index, lines)
            .await?;
        tracing::info!(candy_machine = %candy_machine, index, count, "Config lines written");
        Ok(signature)
    }

    /// Overwrite the config line at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn update_config_line_at(
        &self,
        candy_machine: &WalletAddress,
        index: u64,
        line: CandyItem,
    ) -> Result<Signature, ClientError> {
        self.add_config_lines_at(candy_machine, index, vec![line])
            .await
    }

    /// Mint one NFT for `buyer`.
    ///
    /// Reading the new metadata URI and recording the mint in the backend are
    /// best-effort; their failures are logged and the mint still succeeds.
    ///
    /// # Errors
    ///
    /// - `ClientError::Core` if the candy machine cannot serve a mint.
    /// - `ClientError::Program` if a program call fails.
    pub async fn mint(
        &self,
        candy_machine: &WalletAddress,
        buyer: WalletAddress,
    ) -> Result<MintOutcome, ClientError> {
        let state = self.program.fetch_candy_machine(candy_machine).await?;
        tracing::debug!(
            candy_machine = %candy_machine,
            items_available = state.items_available,
            items_redeemed = state.items_redeemed,
            items_loaded = state.items_loaded,
            "Mint preflight"
        );
        state.check_mintable()?;

        let guard = self.program.fetch_candy_guard(&state.mint_authority).await?;
        let args = guard.as_ref().map(GuardSet::mint_args).unwrap_or_default();

        let outcome = self
            .program
            .mint(MintRequest {
                candy_machine: *candy_machine,
                collection_mint: state.collection_mint,
                collection_update_authority: state.authority,
                buyer,
                args,
            })
            .await?;
        tracing::info!(candy_machine = %candy_machine, mint = %outcome.mint, "NFT minted");

        let uri = match self.program.fetch_metadata(&outcome.mint).await {
            Ok(metadata) => Some(metadata.uri).filter(|uri| !uri.is_empty()),
            Err(e) => {
                tracing::debug!(mint = %outcome.mint, error = %e, "Minted metadata not readable yet");
                None
            }
        };

        if let Some(backend) = &self.backend {
            let request = RecordMintRequest {
                candy_machine_address: *candy_machine,
                mint: outcome.mint,
                authority: buyer,
                uri,
            };
            if let Err(e) = backend.record_mint(request).await {
                tracing::warn!(
                    candy_machine = %candy_machine,
                    mint = %outcome.mint,
                    error = %e,
                    "Failed to record mint in backend"
                );
            }
        }

        Ok(outcome)
    }

    /// Display summary of a candy machine.
    ///
    /// # Errors
    ///
    /// Returns an error if an account cannot be read.
    pub async fn status(
        &self,
        candy_machine: &WalletAddress,
    ) -> Result<CandyMachineStatus, ClientError> {
        let state = self.program.fetch_candy_machine(candy_machine).await?;
        let guard = self.program.fetch_candy_guard(&state.mint_authority).await?;
        Ok(state.status(guard.as_ref()))
    }

    /// Diagnose a candy machine.
    ///
    /// # Errors
    ///
    /// Returns an error if an account cannot be read.
    pub async fn health(
        &self,
        candy_machine: &WalletAddress,
    ) -> Result<CandyMachineHealth, ClientError> {
        let state = self.program.fetch_candy_machine(candy_machine).await?;
        let guard = self.program.fetch_candy_guard(&state.mint_authority).await?;
        let health = state.health(guard.as_ref(), Some(self.program.identity()));

        if !health.is_healthy() {
            tracing::info!(candy_machine = %candy_machine, issues = ?health.issues, "Candy machine has issues");
        }
        Ok(health)
    }

    /// Read a candy machine, retrying while it propagates.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Program` once the retry budget is spent or on any
    /// error other than a missing account.
    pub async fn raw_state(
        &self,
        candy_machine: &WalletAddress,
    ) -> Result<CandyMachineState, ClientError> {
        let program = &self.program;
        let state = retry_if(
            self.fetch_policy,
            move || async move { program.fetch_candy_machine(candy_machine).await },
            ProgramError::is_account_not_found,
        )
        .await?;
        Ok(state)
    }

    /// Replace the guards of a candy machine.
    ///
    /// Payment destinations left empty go to the identity wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the candy machine cannot be read or the update fails.
    pub async fn update_guards(
        &self,
        candy_machine: &WalletAddress,
        guards: &GuardConfig,
    ) -> Result<Signature, ClientError> {
        self.program.fetch_candy_machine(candy_machine).await?;

        let set = guards
            .resolve(self.program.identity())
            .unwrap_or_default();
        let signature = self.program.update_guards(candy_machine, set).await?;

        tracing::info!(candy_machine = %candy_machine, signature = %signature, "Guards updated");
        Ok(signature)
    }

    async fn fetch_metadata_with_retry(
        &self,
        mint: &WalletAddress,
    ) -> Result<TokenMetadata, ClientError> {
        let program = &self.program;
        let metadata = retry_if(
            self.collection_policy,
            move || async move { program.fetch_metadata(mint).await },
            ProgramError::is_account_not_found,
        )
        .await?;
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use dealifi_core::{CoreError, SolPayment, SolPaymentConfig};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn address(byte: u8) -> WalletAddress {
        WalletAddress::from_bytes([byte; 32])
    }

    const IDENTITY: u8 = 1;
    const COLLECTION: u8 = 2;
    const CANDY_MACHINE: u8 = 3;
    const GUARD: u8 = 4;
    const NEW_MINT: u8 = 5;

    fn loaded_state(available: u64, redeemed: u64, loaded: u64) -> CandyMachineState {
        CandyMachineState {
            address: address(CANDY_MACHINE),
            authority: address(IDENTITY),
            mint_authority: address(GUARD),
            collection_mint: address(COLLECTION),
            items_available: available,
            items_redeemed: redeemed,
            items_loaded: loaded,
            is_mutable: true,
            max_edition_supply: 0,
        }
    }

    /// In-memory program double.
    struct FakeProgram {
        wallet_exists: bool,
        metadata_misses: AtomicU32,
        metadata_calls: AtomicU32,
        fetch_misses: AtomicU32,
        fetch_calls: AtomicU32,
        state: Mutex<CandyMachineState>,
        guard: Option<GuardSet>,
        created: Mutex<Option<CreateCandyMachineArgs>>,
        collections: Mutex<Vec<CreateCollectionArgs>>,
        config_writes: Mutex<Vec<(u64, usize)>>,
        mints: Mutex<Vec<MintRequest>>,
        guard_updates: Mutex<Vec<GuardSet>>,
    }

    impl FakeProgram {
        fn new(state: CandyMachineState) -> Self {
            Self {
                wallet_exists: true,
                metadata_misses: AtomicU32::new(0),
                metadata_calls: AtomicU32::new(0),
                fetch_misses: AtomicU32::new(0),
                fetch_calls: AtomicU32::new(0),
                state: Mutex::new(state),
                guard: None,
                created: Mutex::new(None),
                collections: Mutex::new(Vec::new()),
                config_writes: Mutex::new(Vec::new()),
                mints: Mutex::new(Vec::new()),
                guard_updates: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CandyMachineProgram for FakeProgram {
        fn identity(&self) -> WalletAddress {
            address(IDENTITY)
        }

        async fn account_exists(&self, _address: &WalletAddress) -> Result<bool, ProgramError> {
            Ok(self.wallet_exists)
        }

        async fn create_collection(
            &self,
            args: CreateCollectionArgs,
        ) -> Result<WalletAddress, ProgramError> {
            self.collections.lock().unwrap().push(args);
            Ok(address(COLLECTION))
        }

        async fn fetch_metadata(&self, mint: &WalletAddress) -> Result<TokenMetadata, ProgramError> {
            self.metadata_calls.fetch_add(1, Ordering::SeqCst);
            let missing = self
                .metadata_misses
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if missing {
                return Err(ProgramError::AccountNotFound(*mint));
            }
            Ok(TokenMetadata {
                mint: *mint,
                name: "DEAL #1".into(),
                symbol: "DEAL".into(),
                uri: "https://arweave.net/meta".into(),
            })
        }

        async fn create_candy_machine(
            &self,
            args: CreateCandyMachineArgs,
        ) -> Result<WalletAddress, ProgramError> {
            *self.created.lock().unwrap() = Some(args);
            Ok(address(CANDY_MACHINE))
        }

        async fn add_config_lines(
            &self,
            _candy_machine: &WalletAddress,
            index: u64,
            lines: Vec<CandyItem>,
        ) -> Result<Signature, ProgramError> {
            self.config_writes.lock().unwrap().push((index, lines.len()));
            Ok("sig-lines".into())
        }

        async fn fetch_candy_machine(
            &self,
            candy_machine: &WalletAddress,
        ) -> Result<CandyMachineState, ProgramError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            let missing = self
                .fetch_misses
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if missing {
                return Err(ProgramError::AccountNotFound(*candy_machine));
            }
            Ok(self.state.lock().unwrap().clone())
        }

        async fn fetch_candy_guard(
            &self,
            _mint_authority: &WalletAddress,
        ) -> Result<Option<GuardSet>, ProgramError> {
            Ok(self.guard.clone())
        }

        async fn mint(&self, request: MintRequest) -> Result<MintOutcome, ProgramError> {
            self.mints.lock().unwrap().push(request);
            self.state.lock().unwrap().items_redeemed += 1;
            Ok(MintOutcome {
                mint: address(NEW_MINT),
                signature: "sig-mint".into(),
            })
        }

        async fn update_guards(
            &self,
            _candy_machine: &WalletAddress,
            guards: GuardSet,
        ) -> Result<Signature, ProgramError> {
            self.guard_updates.lock().unwrap().push(guards);
            Ok("sig-guards".into())
        }
    }

    fn fast(program: FakeProgram) -> CandyMachineManager<FakeProgram> {
        CandyMachineManager::new(program).with_retry_policies(
            RetryPolicy::new(5, Duration::from_millis(1)),
            RetryPolicy::new(10, Duration::from_millis(1)),
        )
    }

    // ========================================================================
    // Creation
    // ========================================================================

    #[tokio::test]
    async fn create_waits_for_collection_metadata() {
        let program = FakeProgram::new(loaded_state(3, 0, 0));
        program.metadata_misses.store(3, Ordering::SeqCst);
        let manager = fast(program);

        let guards = GuardConfig {
            sol_payment: Some(SolPaymentConfig {
                lamports: 100_000_000,
                destination: None,
            }),
            ..GuardConfig::default()
        };
        let created = manager
            .create_candy_machine(&CandyMachineConfig::new("DEAL", 3), Some(&guards))
            .await
            .unwrap();

        assert_eq!(created.candy_machine, address(CANDY_MACHINE));
        assert_eq!(created.collection, address(COLLECTION));

        let program = manager.program();
        assert_eq!(program.metadata_calls.load(Ordering::SeqCst), 4);
        assert_eq!(program.collections.lock().unwrap()[0].name, "DEAL Collection");

        let args = program.created.lock().unwrap().clone().unwrap();
        assert_eq!(args.config_line_settings.prefix_name, "DEAL #");
        assert_eq!(args.config_line_settings.name_length, 26);
        assert_eq!(args.config_line_settings.uri_length, 200);
        assert_eq!(
            args.guards.unwrap().sol_payment,
            Some(SolPayment {
                lamports: 100_000_000,
                destination: address(IDENTITY),
            })
        );
    }

    #[tokio::test]
    async fn create_gives_up_after_metadata_budget() {
        let program = FakeProgram::new(loaded_state(3, 0, 0));
        program.metadata_misses.store(100, Ordering::SeqCst);
        let manager = fast(program);

        let err = manager
            .create_candy_machine(&CandyMachineConfig::new("DEAL", 3), None)
            .await
            .unwrap_err();

        assert!(err.is_account_not_found());
        assert_eq!(manager.program().metadata_calls.load(Ordering::SeqCst), 5);
        assert!(manager.program().created.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn create_rejects_missing_wallet() {
        let mut program = FakeProgram::new(loaded_state(3, 0, 0));
        program.wallet_exists = false;
        let manager = fast(program);

        let err = manager
            .create_candy_machine(&CandyMachineConfig::new("DEAL", 3), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::AccountNotFound { .. }));
        assert!(manager.program().collections.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_long_symbol_before_spending() {
        let manager = fast(FakeProgram::new(loaded_state(3, 0, 0)));

        let err = manager
            .create_candy_machine(&CandyMachineConfig::new("S".repeat(40), 3), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Core(CoreError::NameTooLong { .. })));
        assert!(manager.program().collections.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_without_guards_attaches_none() {
        let manager = fast(FakeProgram::new(loaded_state(3, 0, 0)));

        manager
            .create_candy_machine(&CandyMachineConfig::new("DEAL", 3), Some(&GuardConfig::default()))
            .await
            .unwrap();

        let args = manager.program().created.lock().unwrap().clone().unwrap();
        assert!(args.guards.is_none());
    }

    // ========================================================================
    // Config lines
    // ========================================================================

    #[tokio::test]
    async fn append_starts_at_items_loaded_after_retries() {
        let program = FakeProgram::new(loaded_state(5, 0, 2));
        program.fetch_misses.store(2, Ordering::SeqCst);
        let manager = fast(program);

        manager
            .append_config_lines(
                &address(CANDY_MACHINE),
                vec![CandyItem::new("3", "u3"), CandyItem::new("4", "u4")],
            )
            .await
            .unwrap();

        assert_eq!(manager.program().fetch_calls.load(Ordering::SeqCst), 3);
        assert_eq!(*manager.program().config_writes.lock().unwrap(), vec![(2, 2)]);
    }

    #[tokio::test]
    async fn update_single_line() {
        let manager = fast(FakeProgram::new(loaded_state(5, 0, 5)));

        manager
            .update_config_line_at(&address(CANDY_MACHINE), 3, CandyItem::new("4", "u4b"))
            .await
            .unwrap();

        assert_eq!(*manager.program().config_writes.lock().unwrap(), vec![(3, 1)]);
    }

    #[tokio::test]
    async fn raw_state_gives_up_after_fetch_budget() {
        let program = FakeProgram::new(loaded_state(5, 0, 5));
        program.fetch_misses.store(100, Ordering::SeqCst);
        let manager = fast(program);

        let err = manager.raw_state(&address(CANDY_MACHINE)).await.unwrap_err();

        assert!(err.is_account_not_found());
        assert_eq!(manager.program().fetch_calls.load(Ordering::SeqCst), 10);
    }

    // ========================================================================
    // Minting
    // ========================================================================

    #[tokio::test]
    async fn mint_preflight_rejects_partial_load() {
        let manager = fast(FakeProgram::new(loaded_state(5, 0, 3)));

        let err = manager
            .mint(&address(CANDY_MACHINE), address(9))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClientError::Core(CoreError::NotFullyLoaded {
                loaded: 3,
                available: 5
            })
        ));
        assert!(manager.program().mints.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mint_preflight_rejects_empty() {
        let manager = fast(FakeProgram::new(loaded_state(2, 2, 2)));

        let err = manager
            .mint(&address(CANDY_MACHINE), address(9))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Core(CoreError::CandyMachineEmpty)));
    }

    #[tokio::test]
    async fn mint_passes_payment_destination() {
        let mut program = FakeProgram::new(loaded_state(2, 0, 2));
        program.guard = Some(GuardSet {
            sol_payment: Some(SolPayment {
                lamports: 1,
                destination: address(77),
            }),
            ..GuardSet::default()
        });
        let manager = fast(program);

        let outcome = manager
            .mint(&address(CANDY_MACHINE), address(9))
            .await
            .unwrap();

        assert_eq!(outcome.mint, address(NEW_MINT));
        let mints = manager.program().mints.lock().unwrap();
        assert_eq!(mints[0].args.sol_payment_destination, Some(address(77)));
        assert_eq!(mints[0].collection_update_authority, address(IDENTITY));
        assert_eq!(mints[0].buyer, address(9));
    }

    #[tokio::test]
    async fn mint_records_in_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/candy-machines/minted"))
            .and(body_partial_json(json!({
                "candyMachineAddress": address(CANDY_MACHINE).to_string(),
                "mint": address(NEW_MINT).to_string(),
                "authority": address(9).to_string(),
                "uri": "https://arweave.net/meta"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "merchant": {
                    "merchantAddress": address(IDENTITY).to_string(),
                    "candyMachines": [],
                    "createdAt": "2024-01-01T00:00:00Z",
                    "updatedAt": "2024-01-01T00:00:00Z"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let manager = fast(FakeProgram::new(loaded_state(2, 0, 2)))
            .with_backend(DealifiClient::new(server.uri()).unwrap());

        manager
            .mint(&address(CANDY_MACHINE), address(9))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn mint_survives_backend_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/candy-machines/minted"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let program = FakeProgram::new(loaded_state(2, 0, 2));
        program.metadata_misses.store(1, Ordering::SeqCst);
        let manager = fast(program).with_backend(DealifiClient::new(server.uri()).unwrap());

        let outcome = manager
            .mint(&address(CANDY_MACHINE), address(9))
            .await
            .unwrap();
        assert_eq!(outcome.signature, "sig-mint");
    }

    // ========================================================================
    // Status, health, guards
    // ========================================================================

    #[tokio::test]
    async fn status_and_health() {
        let manager = fast(FakeProgram::new(loaded_state(4, 1, 0)));

        let status = manager.status(&address(CANDY_MACHINE)).await.unwrap();
        assert_eq!(status.remaining, 3);
        assert!(status.is_active);
        assert!(status.guards.is_none());

        let health = manager.health(&address(CANDY_MACHINE)).await.unwrap();
        assert!(!health.is_healthy());
        assert_eq!(health.issues.len(), 2);
        assert_eq!(health.current_wallet, Some(address(IDENTITY)));
    }

    #[tokio::test]
    async fn update_guards_resolves_destination() {
        let manager = fast(FakeProgram::new(loaded_state(4, 0, 4)));

        let guards = GuardConfig {
            sol_payment: Some(SolPaymentConfig {
                lamports: 5,
                destination: None,
            }),
            start_date: Some(1_700_000_000),
            ..GuardConfig::default()
        };
        let signature = manager
            .update_guards(&address(CANDY_MACHINE), &guards)
            .await
            .unwrap();

        assert_eq!(signature, "sig-guards");
        let updates = manager.program().guard_updates.lock().unwrap();
        assert_eq!(updates[0].sol_payment.unwrap().destination, address(IDENTITY));
        assert!(updates[0].start_date.is_some());
    }
}
