mod end_attempt;
mod navigation;
mod replay;
mod retransmit;
