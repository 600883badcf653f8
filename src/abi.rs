use alloy::sol;

// Minimal ERC20 surface. `balanceOf` and `allowance` are only ever probed
// with the zero address by the classifier.
sol! {
    function name() external view returns (string);
    function symbol() external view returns (string);
    function decimals() external view returns (uint8);
    function totalSupply() external view returns (uint256);
    function balanceOf(address owner) external view returns (uint256);
    function allowance(address owner, address spender) external view returns (uint256);
}

// Uniswap V2 factory and pair surface.
sol! {
    function getPair(address tokenA, address tokenB) external view returns (address);
    function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    function token0() external view returns (address);
}
