//! 型別別名

/// 棋盤座標分量
pub type Coord = usize;

/// 方向位移分量（可為負）
pub type Offset = isize;

/// 單位唯一 ID
pub type UnitId = u32;

/// 生命值 / 攻擊力
pub type Health = i32;

/// 模擬時間（秒）
pub type Seconds = f32;
