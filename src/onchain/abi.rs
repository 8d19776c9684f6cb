//! Typed contract interfaces for the external collaborators.
//!
//! Minimal ABIs covering just the calls this client makes. The contracts
//! themselves (registry, market, functions consumer, CCIP bridge, ERC-20)
//! live in a separate repository and are deployed from compiled artifacts
//! by the `deploy` binary.

use alloy::providers::DynProvider;
use alloy::sol;

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface IMarketRegistry {
        struct MarketInfo {
            address marketAddress;
            address functionsConsumer;
            string question;
            uint256 closeTime;
            uint256 settleTime;
            uint256 createdAt;
            address creator;
            bool isActive;
        }

        function getActiveMarkets() external view returns (MarketInfo[] memory);
        function getAllMarkets() external view returns (MarketInfo[] memory);
        function getMarketInfo(address _marketAddress) external view returns (MarketInfo memory);
        function registerMarket(
            address _marketAddress,
            address _functionsConsumer,
            string memory _question,
            uint256 _closeTime,
            uint256 _settleTime
        ) external;
    }
}

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface IPredictionMarket {
        struct Bet {
            uint256 amount;
            bool prediction;
            bool claimed;
            bool isToken;
        }

        function question() external view returns (string memory);
        function oddsYes() external view returns (uint256);
        function oddsNo() external view returns (uint256);
        function status() external view returns (uint8);
        function result() external view returns (bool);
        function getMarketTimes() external view returns (uint256 closeTime, uint256 settleTime);
        function getTimeRemaining() external view returns (uint256 untilClose, uint256 untilSettle);
        function getPoolTotals()
            external
            view
            returns (
                uint256 ethYes,
                uint256 ethNo,
                uint256 tokenYes,
                uint256 tokenNo,
                uint256 totalEth,
                uint256 totalToken
            );
        function tokenBettingEnabled() external view returns (bool);
        function betToken() external view returns (address);
        function getUserBets(address user) external view returns (Bet[] memory);
        function placeBet(bool prediction) external payable;
        function placeBetWithToken(address user, bool prediction, uint256 amount) external;
        function claimWinnings() external;
        function checkAndCloseMarket() external;
    }
}

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface IFunctionsConsumer {
        function requestOdds(
            string[] memory args,
            uint64 subscriptionId,
            uint32 gasLimit
        ) external returns (bytes32 requestId);
        function predictionMarket() external view returns (address);
    }
}

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface ICcipBetBridge {
        function sendBetWithToken(
            uint64 destinationChainSelector,
            address receiver,
            string memory eventId,
            bool prediction,
            address token,
            uint256 amount,
            bool payWithLINK
        ) external payable returns (bytes32 messageId);
        function allowlistedSourceChains(uint64 selector) external view returns (bool);
        function allowlistedSenders(address sender) external view returns (bool);
        function predictionMarket() external view returns (address);
    }
}

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

pub type RegistryHandle = IMarketRegistry::IMarketRegistryInstance<DynProvider>;
pub type MarketHandle = IPredictionMarket::IPredictionMarketInstance<DynProvider>;
pub type ConsumerHandle = IFunctionsConsumer::IFunctionsConsumerInstance<DynProvider>;
pub type BridgeHandle = ICcipBetBridge::ICcipBetBridgeInstance<DynProvider>;
pub type TokenHandle = IERC20::IERC20Instance<DynProvider>;
