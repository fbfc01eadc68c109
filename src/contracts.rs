//! Centralized Contract Definitions
//!
//! All Solidity interfaces the bot talks to, defined using alloy's `sol!`
//! macro. Read-only interfaces carry `#[sol(rpc)]` so they can be called
//! through any alloy Provider; the router and token interfaces are only used
//! to encode call data for locally signed transactions.
//!
//! Created: 2026-10-17

use alloy::sol;

// ── ERC20 ─────────────────────────────────────────────────────────────

sol! {
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

// ── Uniswap V2 ───────────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }
}

sol! {
    #[sol(rpc)]
    interface IUniswapV2Pair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }
}

sol! {
    interface IUniswapV2Router02 {
        function swapExactETHForTokens(uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external payable returns (uint256[] memory amounts);
        function swapExactTokensForETH(uint256 amountIn, uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external returns (uint256[] memory amounts);
    }
}

// ── Universal Router ─────────────────────────────────────────────────
// The two `execute` overloads live in separate interfaces so each gets a
// plain `executeCall` type.

sol! {
    interface IUniversalRouter {
        function execute(bytes calldata commands, bytes[] calldata inputs, uint256 deadline) external payable;
    }
}

sol! {
    interface IUniversalRouterNoDeadline {
        function execute(bytes calldata commands, bytes[] calldata inputs) external payable;
    }
}
